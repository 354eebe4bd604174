/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::{
    *,
    super::{
        buffer::PgsBuffer,
        error::{FragmentationError, PgsError},
        image::TRANSPARENT,
        rle,
        segment::{
            CompositionObject,
            CompositionState,
            Crop,
            PaletteEntry,
            WindowDefinition,
            WriteSegmentExt,
        },
    },
};
use rand::{thread_rng, Rng};

fn display_set(objects: usize) -> DisplaySet {

    let mut rng = thread_rng();
    let pts = rng.gen();
    let dts = rng.gen();

    DisplaySet {
        pcs: PresentationCompositionSegment {
            pts,
            dts,
            width: 1920,
            height: 1080,
            frame_rate: 0x10,
            composition_number: rng.gen(),
            composition_state: CompositionState::EpochStart,
            palette_update: false,
            palette_id: 0,
            composition_objects: (0..objects as u16).map(|object_id|
                CompositionObject {
                    object_id,
                    window_id: object_id as u8,
                    x: rng.gen(),
                    y: rng.gen(),
                    crop: if object_id == 1 {
                        Some(Crop { x: 0, y: 0, width: rng.gen(), height: rng.gen() })
                    } else {
                        None
                    },
                }
            ).collect(),
        },
        wds: WindowDefinitionSegment {
            pts,
            dts,
            windows: (0..objects as u8).map(|id|
                WindowDefinition {
                    id,
                    x: rng.gen(),
                    y: rng.gen(),
                    width: rng.gen(),
                    height: rng.gen(),
                }
            ).collect(),
        },
        palettes: vec![
            PaletteDefinitionSegment {
                pts,
                dts,
                id: 0,
                version: 0,
                entries: vec![
                    PaletteEntry { id: 0, y: 16, cr: 128, cb: 128, alpha: 0 },
                    PaletteEntry { id: 1, y: 235, cr: 128, cb: 128, alpha: 255 },
                ],
            },
        ],
        objects: (0..objects as u16).map(|id|
            ObjectDefinitionSegment {
                pts,
                dts,
                id,
                version: 0,
                width: 4,
                height: 2,
                data: rle::encode(&[[0, 1, 1, 0], [1, 1, 1, 1]]),
                ..Default::default()
            }
        ).collect(),
        end: EndSegment { pts, dts },
    }
}

fn cycle(display_set: &DisplaySet) -> DisplaySet {

    let mut buffer = PgsBuffer::writable();

    buffer.write_display_set(display_set).unwrap();

    let bytes = buffer.into_bytes();
    let mut input = PgsBuffer::read_only(&bytes);
    let cycled = input.read_display_set(0).unwrap();

    assert!(!input.can_read(1));

    cycled
}

#[test]
fn test_ds_cycle_empty() {

    let display_set = display_set(0);

    assert_eq!(cycle(&display_set), display_set);
}

#[test]
fn test_ds_cycle_not_empty() {

    let display_set = display_set(2);

    assert_eq!(cycle(&display_set), display_set);
}

#[test]
fn test_ds_cycle_large_object() {

    let mut display_set = display_set(1);
    let rows = (0..400).map(|row| (0..1000).map(|col| ((row * col) % 7) as u8).collect())
        .collect::<Vec<Vec<u8>>>();

    display_set.objects[0].width = 1000;
    display_set.objects[0].height = 400;
    display_set.objects[0].data = rle::encode(&rows);

    assert!(display_set.objects[0].data.len() > 0xFFFF);
    assert_eq!(cycle(&display_set), display_set);
}

#[test]
fn test_write_matches_segments() {

    let display_set = display_set(2);
    let mut whole = PgsBuffer::writable();
    let mut piecewise = PgsBuffer::writable();

    whole.write_display_set(&display_set).unwrap();

    for segment in &display_set.to_segments() {
        piecewise.write_segment(segment).unwrap();
    }

    assert_eq!(whole.into_bytes(), piecewise.into_bytes());
}

#[test]
fn test_segment_order() {

    let kinds = display_set(2).to_segments().iter().map(Segment::kind).collect::<Vec<_>>();

    assert_eq!(
        kinds,
        vec![
            SegmentKind::PresentationComposition,
            SegmentKind::WindowDefinition,
            SegmentKind::PaletteDefinition,
            SegmentKind::ObjectDefinition,
            SegmentKind::ObjectDefinition,
            SegmentKind::End,
        ],
    );
}

#[test]
fn test_from_segments_exactly_one_each() {

    let segments = display_set(1).to_segments();

    assert!(DisplaySet::from_segments(0, segments).is_ok());
}

#[test]
fn test_from_segments_two_pcs() {

    let mut segments = display_set(1).to_segments();

    segments.insert(1, segments[0].clone());

    assert_eq!(
        DisplaySet::from_segments(4, segments),
        Err(PgsError::Structural {
            source: StructuralError::DisplaySetMultiplicity { index: 4, kind: "PCS", count: 2 },
        }),
    );
}

#[test]
fn test_from_segments_missing_wds() {

    let mut segments = display_set(1).to_segments();

    segments.remove(1);

    assert_eq!(
        DisplaySet::from_segments(0, segments),
        Err(PgsError::Structural {
            source: StructuralError::DisplaySetMultiplicity { index: 0, kind: "WDS", count: 0 },
        }),
    );
}

#[test]
fn test_from_segments_duplicate_palette() {

    let mut segments = display_set(1).to_segments();

    segments.insert(2, segments[2].clone());

    assert_eq!(
        DisplaySet::from_segments(0, segments),
        Err(PgsError::Structural {
            source: StructuralError::DuplicatePaletteId { index: 0, id: 0 },
        }),
    );
}

#[test]
fn test_from_segments_duplicate_object() {

    let mut segments = display_set(1).to_segments();

    segments.insert(3, segments[3].clone());

    assert_eq!(
        DisplaySet::from_segments(0, segments),
        Err(PgsError::Structural {
            source: StructuralError::DuplicateObjectId { index: 0, id: 0 },
        }),
    );
}

#[test]
fn test_read_without_end() {

    let mut buffer = PgsBuffer::writable();
    let mut segments = display_set(1).to_segments();

    segments.pop();

    for segment in &segments {
        buffer.write_segment(segment).unwrap();
    }

    let bytes = buffer.into_bytes();

    assert_eq!(
        PgsBuffer::read_only(&bytes).read_display_set(0),
        Err(PgsError::Structural { source: StructuralError::TruncatedStream }),
    );
}

#[test]
fn test_read_object_left_open() {

    let display_set = display_set(0);
    let mut buffer = PgsBuffer::writable();

    buffer.write_segment(&Segment::PresentationComposition(display_set.pcs.clone())).unwrap();
    buffer.write_segment(&Segment::WindowDefinition(display_set.wds.clone())).unwrap();

    // FIRST fragment of object 9 promising 2 more bytes than it carries
    let mut bytes = buffer.into_bytes();

    bytes.extend(&[0x50, 0x47, 0, 0, 0, 0, 0, 0, 0, 0, 0x15, 0x00, 0x0D]);
    bytes.extend(&[0x00, 0x09, 0x00, 0x80, 0x00, 0x00, 0x08, 0x00, 0x01, 0x00, 0x01, 0x05, 0x00]);
    bytes.extend(&[0x50, 0x47, 0, 0, 0, 0, 0, 0, 0, 0, 0x80, 0x00, 0x00]);

    assert_eq!(
        PgsBuffer::read_only(&bytes).read_display_set(0),
        Err(PgsError::Fragmentation {
            source: FragmentationError::IncompleteObject { id: 9, remaining: 2 },
        }),
    );
}

#[test]
fn test_lookups() {

    let mut display_set = display_set(2);

    assert_eq!(display_set.palette(0).map(|pds| pds.entries.len()), Some(2));
    assert!(display_set.palette(1).is_none());
    assert_eq!(display_set.object(1).map(|ods| ods.id), Some(1));
    assert!(display_set.object(2).is_none());

    display_set.object_mut(1).unwrap().version = 3;

    assert_eq!(display_set.objects[1].version, 3);
}

#[test]
fn test_rebuild_palette_with_replacement() {

    let mut display_set = display_set(2);
    let red = [255, 0, 0, 255];
    let image = RgbaImage::new(3, 1, vec![red, TRANSPARENT, red]).unwrap();

    display_set.pcs.palette_update = true;
    display_set.pcs.palette_id = 3;
    display_set.palettes[0].id = 3;
    display_set.palettes[0].version = 4;
    display_set.object_mut(1).unwrap().set_image(image);
    display_set.rebuild_palette().unwrap();

    let pds = &display_set.palettes[0];
    let palette = RgbaPalette::from_pds(pds);

    assert_eq!(display_set.palettes.len(), 1);
    assert_eq!((pds.id, pds.version), (REBUILT_PALETTE_ID, REBUILT_PALETTE_VERSION));
    assert_eq!(display_set.pcs.palette_id, REBUILT_PALETTE_ID);
    assert_eq!(pds.entries[0], PaletteEntry { id: 0, y: 0, cr: 128, cb: 128, alpha: 0 });
    assert!(!display_set.pcs.palette_update);

    let replaced = &display_set.objects[1];
    let pixels = replaced.decode().unwrap().to_rgba(&palette);

    assert_eq!((replaced.width, replaced.height), (3, 1));
    assert!(replaced.image.is_none());
    assert_eq!(pixels.pixels()[1], TRANSPARENT);
    assert_eq!(pixels.pixels()[0][3], 255);

    // the untouched object keeps its shape and its colors
    let kept = display_set.objects[0].decode().unwrap();
    let kept_pixels = kept.to_rgba(&palette);

    assert_eq!((kept.width(), kept.height()), (4, 2));
    assert_eq!(kept.pixels()[0], kept.pixels()[3]);
    assert_eq!(kept_pixels.pixels()[0][3], 0);
    assert_eq!(kept_pixels.pixels()[1][3], 255);
}

#[test]
fn test_rebuild_palette_without_source() {

    let mut display_set = display_set(1);

    display_set.palettes.clear();

    assert_eq!(
        display_set.rebuild_palette(),
        Err(PgsError::Structural { source: StructuralError::MissingImage(0) }),
    );
}
