/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::{
    *,
    super::{
        error::PgsError,
        segment::{CompositionObject, EndSegment},
    },
};

fn palettes(count: u8) -> Vec<Segment> {
    (0..count).map(|id|
        Segment::PaletteDefinition(PaletteDefinitionSegment { id, ..Default::default() })
    ).collect()
}

fn objects(count: u16) -> Vec<Segment> {
    (0..count).map(|id|
        Segment::ObjectDefinition(
            ObjectDefinitionSegment { id, width: 1, height: 1, ..Default::default() }
        )
    ).collect()
}

fn composition(state: CompositionState, object_ids: &[u16]) -> PresentationCompositionSegment {
    PresentationCompositionSegment {
        composition_state: state,
        composition_objects: object_ids.iter().map(|&object_id|
            CompositionObject { object_id, ..Default::default() }
        ).collect(),
        ..Default::default()
    }
}

fn display_set(pcs: PresentationCompositionSegment, object_ids: &[u16]) -> DisplaySet {
    DisplaySet {
        pcs,
        wds: WindowDefinitionSegment::default(),
        palettes: vec![],
        objects: object_ids.iter().map(|&id|
            ObjectDefinitionSegment { id, width: 1, height: 1, ..Default::default() }
        ).collect(),
        end: EndSegment::default(),
    }
}

#[test]
fn test_eight_palettes() {

    let segments = palettes(8);
    let mut context = EpochContext::new();

    for segment in &segments {
        context.update_segment(segment).unwrap();
    }

    assert_eq!(context.palette_count(), 8);
}

#[test]
fn test_nine_palettes() {

    let segments = palettes(9);
    let mut context = EpochContext::new();
    let result = segments.iter().try_for_each(|segment| context.update_segment(segment));

    assert_eq!(
        result,
        Err(PgsError::LimitExceeded { source: LimitError::TooManyPalettes { limit: 8 } }),
    );
}

#[test]
fn test_redefined_palette_is_not_counted_twice() {

    let segments = palettes(8);
    let again = palettes(8);
    let mut context = EpochContext::new();

    for segment in segments.iter().chain(again.iter()) {
        context.update_segment(segment).unwrap();
    }

    assert_eq!(context.palette_count(), 8);
}

#[test]
fn test_sixty_four_objects() {

    let segments = objects(64);
    let mut context = EpochContext::new();

    for segment in &segments {
        context.update_segment(segment).unwrap();
    }

    assert_eq!(context.object_count(), 64);
}

#[test]
fn test_sixty_five_objects() {

    let segments = objects(65);
    let mut context = EpochContext::new();
    let result = segments.iter().try_for_each(|segment| context.update_segment(segment));

    assert_eq!(
        result,
        Err(PgsError::LimitExceeded { source: LimitError::TooManyObjects { limit: 64 } }),
    );
}

#[test]
fn test_epoch_start_clears_caches() {

    let first = Segment::PresentationComposition(composition(CompositionState::EpochStart, &[]));
    let second = Segment::PresentationComposition(composition(CompositionState::EpochStart, &[]));
    let defined = palettes(8);
    let more = palettes(8);
    let mut context = EpochContext::new();

    context.update_segment(&first).unwrap();
    for segment in &defined {
        context.update_segment(segment).unwrap();
    }
    context.update_segment(&second).unwrap();

    assert_eq!(context.palette_count(), 0);
    assert!(context.palette(0).is_none());

    // a fresh epoch has room for a full set of palettes again
    for segment in &more {
        context.update_segment(segment).unwrap();
    }
}

#[test]
fn test_normal_composition_keeps_caches() {

    let start = Segment::PresentationComposition(composition(CompositionState::EpochStart, &[]));
    let normal = Segment::PresentationComposition(composition(CompositionState::Normal, &[]));
    let defined = objects(3);
    let mut context = EpochContext::new();

    context.update_segment(&start).unwrap();
    for segment in &defined {
        context.update_segment(segment).unwrap();
    }
    context.update_segment(&normal).unwrap();

    assert_eq!(context.object_count(), 3);
    assert_eq!(context.composition().map(|pcs| pcs.composition_state), Some(CompositionState::Normal));
}

#[test]
fn test_reference_to_earlier_display_set() {

    let defining = display_set(composition(CompositionState::EpochStart, &[0]), &[0, 1]);
    let referencing = display_set(composition(CompositionState::Normal, &[1]), &[]);
    let mut context = EpochContext::new();

    context.update(&defining).unwrap();
    context.update(&referencing).unwrap();

    assert_eq!(context.object(1).map(|ods| ods.id), Some(1));
}

#[test]
fn test_stale_reference_after_epoch_start() {

    let defining = display_set(composition(CompositionState::EpochStart, &[0]), &[0, 1]);
    let restarting = display_set(composition(CompositionState::EpochStart, &[]), &[]);
    let stale = display_set(composition(CompositionState::Normal, &[1]), &[]);
    let mut context = EpochContext::new();

    context.update(&defining).unwrap();
    context.update(&restarting).unwrap();

    assert_eq!(
        context.update(&stale),
        Err(PgsError::Structural { source: StructuralError::UnknownObjectReference(1) }),
    );
}

#[test]
fn test_palette_update_needs_palette() {

    let mut pcs = composition(CompositionState::Normal, &[]);

    pcs.palette_update = true;
    pcs.palette_id = 3;

    let update = display_set(pcs, &[]);
    let mut context = EpochContext::new();

    assert_eq!(
        context.update(&update),
        Err(PgsError::Structural { source: StructuralError::UnknownPaletteReference(3) }),
    );
}

#[test]
fn test_windows_are_cached() {

    let wds = WindowDefinitionSegment {
        windows: vec![WindowDefinition { id: 2, width: 100, ..Default::default() }],
        ..Default::default()
    };
    let mut context = EpochContext::new();

    context.update_windows(&wds);

    assert_eq!(context.window(2).map(|window| window.width), Some(100));
    assert!(context.window(0).is_none());
}
