/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    DisplaySet,
    super::{
        buffer::PgsBuffer,
        error::{PgsResult, StructuralError},
        segment::{fragment::ObjectAssembler, ReadSegmentExt, Segment},
    },
};
use tracing::debug;

/// Allows reading display sets from a source.
pub trait ReadDisplaySetExt {
    /// Reads segments up to and including the next END segment and groups them into a display
    /// set.
    ///
    /// `index` is the display set's position within the stream, used in error reports.
    fn read_display_set(&mut self, index: usize) -> PgsResult<DisplaySet>;
}

impl ReadDisplaySetExt for PgsBuffer<'_> {

    fn read_display_set(&mut self, index: usize) -> PgsResult<DisplaySet> {

        let mut assembler = ObjectAssembler::new();
        let mut segments = Vec::<Segment>::new();

        loop {

            if !self.can_read(1) {
                return Err(StructuralError::TruncatedStream.into())
            }

            let segment = match self.read_segment(&mut assembler)? {
                Some(segment) => segment,
                None => continue,
            };
            let is_end = matches!(segment, Segment::End(_));

            segments.push(segment);

            if is_end {
                break
            }
        }

        assembler.finish_display_set()?;

        let display_set = DisplaySet::from_segments(index, segments)?;

        debug!(
            "display set #{} at pts {} closed with {} palettes and {} objects",
            index,
            display_set.pts(),
            display_set.palettes.len(),
            display_set.objects.len(),
        );

        Ok(display_set)
    }
}
