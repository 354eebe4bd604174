/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    fragment::{FragmentHeader, ObjectAssembler},
    CompositionObject,
    CompositionState,
    Crop,
    EndSegment,
    ObjectDefinitionSegment,
    PaletteDefinitionSegment,
    PaletteEntry,
    PresentationCompositionSegment,
    Segment,
    SegmentKind,
    Sequence,
    WindowDefinition,
    WindowDefinitionSegment,
    COMPOSITION_OBJECT_LAYOUT,
    CROP_LAYOUT,
    HEADER_LAYOUT,
    MAGIC_NUMBER,
    MAX_COMPOSITION_OBJECTS,
    OBJECT_DATA_LAYOUT,
    ODS_LAYOUT,
    PALETTE_ENTRY_LAYOUT,
    PCS_LAYOUT,
    PDS_LAYOUT,
    WDS_LAYOUT,
    WINDOW_LAYOUT,
    super::{
        buffer::{layout_size, PgsBuffer},
        error::{BufferError, LimitError, PgsError, PgsResult, StructuralError},
    },
};
use std::convert::TryFrom;
use tracing::trace;

/// Allows reading segments from a source.
pub trait ReadSegmentExt {
    /// Reads the next segment.
    ///
    /// Object fragments are handed to `assembler`. A fragment that does not finish its object
    /// yields `None`; the fragment that does yields the whole object.
    fn read_segment(&mut self, assembler: &mut ObjectAssembler) -> PgsResult<Option<Segment>>;
}

impl ReadSegmentExt for PgsBuffer<'_> {

    fn read_segment(&mut self, assembler: &mut ObjectAssembler) -> PgsResult<Option<Segment>> {

        let offset = self.position();
        let [magic, pts, dts, kind, size] = self.unpack(&HEADER_LAYOUT)?;

        if magic != MAGIC_NUMBER {
            return Err(StructuralError::UnrecognizedMagicNumber { offset, magic: magic as u16 }.into())
        }

        let kind = SegmentKind::try_from(kind as u8)
            .map_err(|kind| StructuralError::UnrecognizedKind { offset, kind })?;
        let pts = pts as u32;
        let dts = dts as u32;
        let size = size as usize;

        trace!("reading {} segment at {:#x} with {} payload bytes", kind.name(), offset, size);

        let payload = if size == 0 { &[][..] } else { self.read(size)? };
        let mut input = PgsBuffer::read_only(payload);
        let segment = match parse_payload(&mut input, kind, pts, dts, offset, size, assembler) {
            Err(PgsError::Buffer { source: BufferError::TruncatedInput { requested, available } }) => {
                return Err(
                    StructuralError::SegmentLengthMismatch {
                        offset,
                        declared: size,
                        consumed: size - available + requested,
                    }.into()
                )
            }
            result => result?,
        };
        let consumed = input.position();

        if consumed != size {
            return Err(
                StructuralError::SegmentLengthMismatch { offset, declared: size, consumed }.into()
            )
        }

        Ok(segment)
    }
}

/// Parses a payload that has already been cut to its declared size.
fn parse_payload(
    input: &mut PgsBuffer,
    kind: SegmentKind,
    pts: u32,
    dts: u32,
    offset: usize,
    size: usize,
    assembler: &mut ObjectAssembler,
) -> PgsResult<Option<Segment>> {
    match kind {
        SegmentKind::PaletteDefinition => {
            Ok(Some(Segment::PaletteDefinition(parse_pds(input, pts, dts, size)?)))
        }
        SegmentKind::ObjectDefinition => {
            Ok(parse_ods(input, pts, dts, offset, size, assembler)?.map(Segment::ObjectDefinition))
        }
        SegmentKind::PresentationComposition => {
            Ok(Some(Segment::PresentationComposition(parse_pcs(input, pts, dts)?)))
        }
        SegmentKind::WindowDefinition => {
            Ok(Some(Segment::WindowDefinition(parse_wds(input, pts, dts)?)))
        }
        SegmentKind::End => {
            if size != 0 {
                return Err(StructuralError::EndSegmentNotEmpty(size).into())
            }
            Ok(Some(Segment::End(EndSegment { pts, dts })))
        }
    }
}

fn parse_pcs(
    input: &mut PgsBuffer,
    pts: u32,
    dts: u32,
) -> PgsResult<PresentationCompositionSegment> {

    let [
        width,
        height,
        frame_rate,
        composition_number,
        state_flag,
        palette_update_flag,
        palette_id,
        comp_obj_count,
    ] = input.unpack(&PCS_LAYOUT)?;

    let composition_state = match state_flag as u8 {
        0x00 => CompositionState::Normal,
        0x40 => CompositionState::AcquisitionPoint,
        0x80 => CompositionState::EpochStart,
        0xC0 => CompositionState::EpochContinue,
        flag => return Err(StructuralError::UnrecognizedCompositionState(flag).into()),
    };
    let palette_update = match palette_update_flag as u8 {
        0x00 => false,
        0x80 => true,
        flag => return Err(StructuralError::UnrecognizedPaletteUpdateFlag(flag).into()),
    };
    let comp_obj_count = comp_obj_count as usize;

    if comp_obj_count > MAX_COMPOSITION_OBJECTS {
        return Err(
            LimitError::TooManyCompositionObjects {
                count: comp_obj_count,
                limit: MAX_COMPOSITION_OBJECTS,
            }.into()
        )
    }

    let mut composition_objects = Vec::with_capacity(comp_obj_count);

    for _ in 0..comp_obj_count {

        let [object_id, window_id, cropped_flag, x, y] =
            input.unpack(&COMPOSITION_OBJECT_LAYOUT)?;
        let crop = match cropped_flag as u8 {
            0x40 => {
                let [x, y, width, height] = input.unpack(&CROP_LAYOUT)?;
                Some(
                    Crop {
                        x: x as u16,
                        y: y as u16,
                        width: width as u16,
                        height: height as u16,
                    }
                )
            }
            0x00 => None,
            flag => return Err(StructuralError::UnrecognizedCropFlag(flag).into()),
        };

        composition_objects.push(
            CompositionObject {
                object_id: object_id as u16,
                window_id: window_id as u8,
                x: x as u16,
                y: y as u16,
                crop,
            }
        );
    }

    Ok(
        PresentationCompositionSegment {
            pts,
            dts,
            width: width as u16,
            height: height as u16,
            frame_rate: frame_rate as u8,
            composition_number: composition_number as u16,
            composition_state,
            palette_update,
            palette_id: palette_id as u8,
            composition_objects,
        }
    )
}

fn parse_wds(
    input: &mut PgsBuffer,
    pts: u32,
    dts: u32,
) -> PgsResult<WindowDefinitionSegment> {

    let [count] = input.unpack(&WDS_LAYOUT)?;
    let mut windows = Vec::with_capacity(count as usize);

    for _ in 0..count {

        let [id, x, y, width, height] = input.unpack(&WINDOW_LAYOUT)?;

        windows.push(
            WindowDefinition {
                id: id as u8,
                x: x as u16,
                y: y as u16,
                width: width as u16,
                height: height as u16,
            }
        );
    }

    Ok(
        WindowDefinitionSegment {
            pts,
            dts,
            windows,
        }
    )
}

fn parse_pds(
    input: &mut PgsBuffer,
    pts: u32,
    dts: u32,
    size: usize,
) -> PgsResult<PaletteDefinitionSegment> {

    let header_size = layout_size(&PDS_LAYOUT);
    let entry_size = layout_size(&PALETTE_ENTRY_LAYOUT);

    if size < header_size || (size - header_size) % entry_size != 0 {
        return Err(StructuralError::InvalidPaletteLength(size).into())
    }

    let count = (size - header_size) / entry_size;
    let [id, version] = input.unpack(&PDS_LAYOUT)?;
    let mut entries = Vec::with_capacity(count);

    for _ in 0..count {

        let [id, y, cr, cb, alpha] = input.unpack(&PALETTE_ENTRY_LAYOUT)?;

        entries.push(
            PaletteEntry {
                id: id as u8,
                y: y as u8,
                cr: cr as u8,
                cb: cb as u8,
                alpha: alpha as u8,
            }
        );
    }

    Ok(
        PaletteDefinitionSegment {
            pts,
            dts,
            id: id as u8,
            version: version as u8,
            entries,
        }
    )
}

fn parse_ods(
    input: &mut PgsBuffer,
    pts: u32,
    dts: u32,
    offset: usize,
    size: usize,
    assembler: &mut ObjectAssembler,
) -> PgsResult<Option<ObjectDefinitionSegment>> {

    let [id, version, sequence_flag] = input.unpack(&ODS_LAYOUT)?;
    let sequence = match sequence_flag as u8 {
        0xC0 => Sequence::Single,
        0x80 => Sequence::First,
        0x00 => Sequence::Middle,
        0x40 => Sequence::Last,
        flag => return Err(StructuralError::UnrecognizedSequenceFlag(flag).into()),
    };
    let header = FragmentHeader {
        pts,
        dts,
        id: id as u16,
        version: version as u8,
        sequence,
    };
    let too_short = |consumed| StructuralError::SegmentLengthMismatch {
        offset,
        declared: size,
        consumed,
    };
    let header_size = layout_size(&ODS_LAYOUT);
    let fragment_size = size.checked_sub(header_size).ok_or_else(|| too_short(header_size))?;

    if sequence.is_first() {

        let data_header_size = layout_size(&OBJECT_DATA_LAYOUT);
        let [data_length, width, height] = input.unpack(&OBJECT_DATA_LAYOUT)?;
        let chunk_size = fragment_size.checked_sub(data_header_size)
            .ok_or_else(|| too_short(header_size + data_header_size))?;
        let chunk = read_chunk(input, chunk_size)?;

        assembler.begin(
            header,
            data_length as usize,
            width as u16,
            height as u16,
            chunk,
            fragment_size,
        )
    } else {

        let chunk = read_chunk(input, fragment_size)?;

        assembler.extend(header, chunk)
    }
}

fn read_chunk<'b>(input: &'b mut PgsBuffer, size: usize) -> PgsResult<&'b [u8]> {
    if size == 0 {
        Ok(&[])
    } else {
        input.read(size)
    }
}
