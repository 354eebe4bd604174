/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    EndSegment,
    ObjectDefinitionSegment,
    PaletteDefinitionSegment,
    PresentationCompositionSegment,
    Segment,
    SegmentKind,
    Sequence,
    WindowDefinitionSegment,
    COMPOSITION_OBJECT_LAYOUT,
    CROP_LAYOUT,
    HEADER_LAYOUT,
    MAGIC_NUMBER,
    MAX_COMPOSITION_OBJECTS,
    MAX_OBJECT_DATA_SIZE,
    MAX_SEGMENT_SIZE,
    OBJECT_DATA_LAYOUT,
    ODS_LAYOUT,
    PALETTE_ENTRY_LAYOUT,
    PCS_LAYOUT,
    PDS_LAYOUT,
    WDS_LAYOUT,
    WINDOW_LAYOUT,
    super::{
        buffer::{layout_size, PgsBuffer},
        error::{LimitError, PgsResult, StructuralError},
    },
};
use tracing::{debug, trace};

/// The largest slice of object data a single ODS fragment can carry.
pub const MAX_FRAGMENT_SIZE: usize = MAX_SEGMENT_SIZE - layout_size(&ODS_LAYOUT);

/// Allows writing segments to a destination.
///
/// The payload size is always derived from the serialized payload. An object too large for one
/// segment is written as several consecutive fragments.
pub trait WriteSegmentExt {
    /// Writes a segment of any kind.
    fn write_segment(&mut self, segment: &Segment) -> PgsResult<()>;
    fn write_pcs(&mut self, pcs: &PresentationCompositionSegment) -> PgsResult<()>;
    fn write_wds(&mut self, wds: &WindowDefinitionSegment) -> PgsResult<()>;
    fn write_pds(&mut self, pds: &PaletteDefinitionSegment) -> PgsResult<()>;
    fn write_ods(&mut self, ods: &ObjectDefinitionSegment) -> PgsResult<()>;
    fn write_es(&mut self, es: &EndSegment) -> PgsResult<()>;
}

impl WriteSegmentExt for PgsBuffer<'_> {

    fn write_segment(&mut self, segment: &Segment) -> PgsResult<()> {
        match segment {
            Segment::PresentationComposition(pcs) => self.write_pcs(pcs),
            Segment::WindowDefinition(wds) => self.write_wds(wds),
            Segment::PaletteDefinition(pds) => self.write_pds(pds),
            Segment::ObjectDefinition(ods) => self.write_ods(ods),
            Segment::End(es) => self.write_es(es),
        }
    }

    fn write_pcs(&mut self, pcs: &PresentationCompositionSegment) -> PgsResult<()> {
        let payload = generate_pcs(pcs)?;
        write_raw(self, SegmentKind::PresentationComposition, pcs.pts, pcs.dts, &payload)
    }

    fn write_wds(&mut self, wds: &WindowDefinitionSegment) -> PgsResult<()> {
        let payload = generate_wds(wds)?;
        write_raw(self, SegmentKind::WindowDefinition, wds.pts, wds.dts, &payload)
    }

    fn write_pds(&mut self, pds: &PaletteDefinitionSegment) -> PgsResult<()> {
        let payload = generate_pds(pds)?;
        write_raw(self, SegmentKind::PaletteDefinition, pds.pts, pds.dts, &payload)
    }

    fn write_ods(&mut self, ods: &ObjectDefinitionSegment) -> PgsResult<()> {
        write_object(self, ods)
    }

    fn write_es(&mut self, es: &EndSegment) -> PgsResult<()> {
        write_raw(self, SegmentKind::End, es.pts, es.dts, &[])
    }
}

fn write_raw(
    output: &mut PgsBuffer,
    kind: SegmentKind,
    pts: u32,
    dts: u32,
    payload: &[u8],
) -> PgsResult<()> {

    if payload.len() > MAX_SEGMENT_SIZE {
        return Err(StructuralError::SegmentTooLarge(payload.len()).into())
    }

    trace!(
        "writing {} segment at {:#x} with {} payload bytes",
        kind.name(),
        output.position(),
        payload.len(),
    );

    output.pack(
        &HEADER_LAYOUT,
        [MAGIC_NUMBER, pts as u64, dts as u64, kind.tag() as u64, payload.len() as u64],
    )?;

    if !payload.is_empty() {
        output.write(payload)?;
    }

    Ok(())
}

fn generate_pcs(pcs: &PresentationCompositionSegment) -> PgsResult<Vec<u8>> {

    let mut payload = PgsBuffer::writable();
    let count = pcs.composition_objects.len();

    if count > MAX_COMPOSITION_OBJECTS {
        return Err(
            LimitError::TooManyCompositionObjects { count, limit: MAX_COMPOSITION_OBJECTS }.into()
        )
    }

    payload.pack(
        &PCS_LAYOUT,
        [
            pcs.width as u64,
            pcs.height as u64,
            pcs.frame_rate as u64,
            pcs.composition_number as u64,
            pcs.composition_state.flag() as u64,
            if pcs.palette_update { 0x80 } else { 0x00 },
            pcs.palette_id as u64,
            count as u64,
        ],
    )?;

    for comp_obj in &pcs.composition_objects {

        payload.pack(
            &COMPOSITION_OBJECT_LAYOUT,
            [
                comp_obj.object_id as u64,
                comp_obj.window_id as u64,
                if comp_obj.crop.is_some() { 0x40 } else { 0x00 },
                comp_obj.x as u64,
                comp_obj.y as u64,
            ],
        )?;

        if let Some(crop) = &comp_obj.crop {
            payload.pack(
                &CROP_LAYOUT,
                [crop.x as u64, crop.y as u64, crop.width as u64, crop.height as u64],
            )?;
        }
    }

    Ok(payload.into_bytes())
}

fn generate_wds(wds: &WindowDefinitionSegment) -> PgsResult<Vec<u8>> {

    let mut payload = PgsBuffer::writable();

    if wds.windows.len() > 255 {
        return Err(LimitError::TooManyWindows(wds.windows.len()).into())
    }

    payload.pack(&WDS_LAYOUT, [wds.windows.len() as u64])?;

    for window in wds.windows.iter() {
        payload.pack(
            &WINDOW_LAYOUT,
            [
                window.id as u64,
                window.x as u64,
                window.y as u64,
                window.width as u64,
                window.height as u64,
            ],
        )?;
    }

    Ok(payload.into_bytes())
}

fn generate_pds(pds: &PaletteDefinitionSegment) -> PgsResult<Vec<u8>> {

    let mut payload = PgsBuffer::writable();

    payload.pack(&PDS_LAYOUT, [pds.id as u64, pds.version as u64])?;

    for entry in &pds.entries {
        payload.pack(
            &PALETTE_ENTRY_LAYOUT,
            [
                entry.id as u64,
                entry.y as u64,
                entry.cr as u64,
                entry.cb as u64,
                entry.alpha as u64,
            ],
        )?;
    }

    Ok(payload.into_bytes())
}

fn write_object(output: &mut PgsBuffer, ods: &ObjectDefinitionSegment) -> PgsResult<()> {

    if ods.data.len() > MAX_OBJECT_DATA_SIZE {
        return Err(StructuralError::ObjectDataTooLarge { id: ods.id, size: ods.data.len() }.into())
    }
    if ods.width == 0 || ods.height == 0 {
        return Err(
            StructuralError::EmptyObject { id: ods.id, width: ods.width, height: ods.height }
                .into()
        )
    }

    let mut object_data = PgsBuffer::writable();

    object_data.pack(
        &OBJECT_DATA_LAYOUT,
        [(ods.data.len() + 4) as u64, ods.width as u64, ods.height as u64],
    )?;

    if !ods.data.is_empty() {
        object_data.write(&ods.data)?;
    }

    let object_data = object_data.into_bytes();
    let fragments = object_data.chunks(MAX_FRAGMENT_SIZE).collect::<Vec<&[u8]>>();
    let last_index = fragments.len() - 1;

    if fragments.len() > 1 {
        debug!("object {} split into {} fragments", ods.id, fragments.len());
    }

    for (index, fragment) in fragments.into_iter().enumerate() {

        let sequence = match (index == 0, index == last_index) {
            (true, true) => Sequence::Single,
            (true, false) => Sequence::First,
            (false, false) => Sequence::Middle,
            (false, true) => Sequence::Last,
        };
        let mut payload = PgsBuffer::writable();

        payload.pack(&ODS_LAYOUT, [ods.id as u64, ods.version as u64, sequence.flag() as u64])?;
        payload.write(fragment)?;

        write_raw(output, SegmentKind::ObjectDefinition, ods.pts, ods.dts, &payload.into_bytes())?;
    }

    Ok(())
}
