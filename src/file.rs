/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Reads and writes whole PGS streams.
//!
//! Parsing happens in two passes. The first reads segments, reassembles fragmented objects, and
//! groups everything into display sets. The second walks those display sets with an
//! [`EpochContext`] to enforce the per-epoch limits and to resolve every reference a
//! composition makes. Writing runs the same validation before serializing anything.


use super::{
    buffer::PgsBuffer,
    context::EpochContext,
    displayset::{DisplaySet, ReadDisplaySetExt, WriteDisplaySetExt},
    error::{PgsResult, StructuralError},
    image::{DecodedObject, RgbaPalette},
    segment::{CompositionState, ObjectDefinitionSegment, PaletteDefinitionSegment},
};
use std::collections::BTreeMap;
use tracing::debug;

/// An ordered sequence of display sets.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct PgsFile {
    pub display_sets: Vec<DisplaySet>,
}

impl PgsFile {

    pub fn new(display_sets: Vec<DisplaySet>) -> Self {
        Self { display_sets }
    }

    /// Parses a complete PGS stream, such as the contents of a `.sup` file.
    pub fn from_bytes(bytes: &[u8]) -> PgsResult<Self> {

        let mut input = PgsBuffer::read_only(bytes);
        let mut display_sets = Vec::<DisplaySet>::new();

        while input.can_read(1) {
            display_sets.push(input.read_display_set(display_sets.len())?);
        }

        let file = Self { display_sets };

        file.validate()?;

        debug!("parsed {} display sets from {} bytes", file.display_sets.len(), bytes.len());

        Ok(file)
    }

    /// Replays every display set through a fresh epoch context.
    pub fn validate(&self) -> PgsResult<()> {

        let mut context = EpochContext::new();

        for display_set in &self.display_sets {
            context.update(display_set)?;
        }

        Ok(())
    }

    /// Serializes every display set. Segment sizes are always derived from what is written.
    pub fn write(&self) -> PgsResult<Vec<u8>> {

        self.validate()?;

        let mut output = PgsBuffer::writable();

        for display_set in &self.display_sets {
            output.write_display_set(display_set)?;
        }

        let bytes = output.into_bytes();

        debug!("wrote {} display sets as {} bytes", self.display_sets.len(), bytes.len());

        Ok(bytes)
    }

    /// Decodes every object each display set carries against the palette its composition
    /// selects.
    pub fn decoded_objects(&self) -> PgsResult<Vec<DecodedObject>> {

        let mut context = EpochContext::new();
        let mut decoded = Vec::new();

        for (index, display_set) in self.display_sets.iter().enumerate() {

            context.update(display_set)?;

            if display_set.objects.is_empty() {
                continue
            }

            let palette_id = display_set.pcs.palette_id;
            let palette = context.palette(palette_id)
                .map(RgbaPalette::from_pds)
                .ok_or(StructuralError::UnknownPaletteReference(palette_id))?;

            for ods in &display_set.objects {
                decoded.push(
                    DecodedObject {
                        display_set: index,
                        id: ods.id,
                        pts: ods.pts,
                        bitmap: ods.decode()?,
                        palette: palette.clone(),
                    }
                );
            }
        }

        Ok(decoded)
    }

    /// Makes every display set self-contained.
    ///
    /// Each display set ends up carrying a copy of exactly the objects its composition shows,
    /// taken from the latest definition within the epoch and re-stamped with the display set's
    /// timestamps. A display set that shows anything also receives a copy of its palette if it
    /// does not define one itself. This deliberately duplicates data so that a player can start
    /// at any display set.
    pub fn replicate_objects(&mut self) -> PgsResult<()> {

        let mut objects = BTreeMap::<u16, ObjectDefinitionSegment>::new();
        let mut palettes = BTreeMap::<u8, PaletteDefinitionSegment>::new();
        let mut copies = 0_usize;

        for display_set in &mut self.display_sets {

            let pts = display_set.pcs.pts;
            let dts = display_set.pcs.dts;

            if display_set.pcs.composition_state == CompositionState::EpochStart {
                objects.clear();
                palettes.clear();
            }
            for pds in &display_set.palettes {
                palettes.insert(pds.id, pds.clone());
            }
            for ods in &display_set.objects {
                objects.insert(ods.id, ods.clone());
            }

            let mut replicated = Vec::<ObjectDefinitionSegment>::new();

            for comp_obj in &display_set.pcs.composition_objects {

                if replicated.iter().any(|ods| ods.id == comp_obj.object_id) {
                    continue
                }

                let mut ods = objects.get(&comp_obj.object_id)
                    .cloned()
                    .ok_or(StructuralError::UnknownObjectReference(comp_obj.object_id))?;

                ods.pts = pts;
                ods.dts = dts;
                replicated.push(ods);
            }

            copies += replicated.len();
            display_set.objects = replicated;

            let palette_id = display_set.pcs.palette_id;
            let shows_anything = !display_set.objects.is_empty() || display_set.pcs.palette_update;

            if shows_anything && display_set.palette(palette_id).is_none() {

                let mut pds = palettes.get(&palette_id)
                    .cloned()
                    .ok_or(StructuralError::UnknownPaletteReference(palette_id))?;

                pds.pts = pts;
                pds.dts = dts;
                display_set.palettes.push(pds);
            }
        }

        debug!("replicated {} objects across {} display sets", copies, self.display_sets.len());

        self.validate()
    }
}
