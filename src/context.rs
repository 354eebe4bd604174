/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Tracks what a decoder has cached over the course of an epoch.
//!
//! An epoch begins with a display set whose composition state is `EpochStart`. Every palette,
//! object, and window defined from then on stays cached until the next epoch begins, so a later
//! display set may reference them without redefining them. The context borrows the segments it
//! caches; it lives only as long as the parse or write pass that fills it.

#[cfg(test)]
mod tests;

use super::{
    displayset::DisplaySet,
    error::{LimitError, PgsResult, StructuralError},
    segment::{
        CompositionState,
        ObjectDefinitionSegment,
        PaletteDefinitionSegment,
        PresentationCompositionSegment,
        Segment,
        WindowDefinition,
        WindowDefinitionSegment,
    },
};
use std::collections::BTreeMap;
use tracing::debug;

/// The most palettes an epoch may cache at once.
pub const MAX_PALETTES: usize = 8;

/// The most objects an epoch may cache at once.
pub const MAX_OBJECTS: usize = 64;

#[derive(Clone, Debug, Default)]
pub struct EpochContext<'a> {
    composition: Option<&'a PresentationCompositionSegment>,
    windows: BTreeMap<u8, &'a WindowDefinition>,
    palettes: BTreeMap<u8, &'a PaletteDefinitionSegment>,
    objects: BTreeMap<u16, &'a ObjectDefinitionSegment>,
}

impl<'a> EpochContext<'a> {

    pub fn new() -> Self {
        Self::default()
    }

    /// Discards everything cached by the previous epoch.
    pub fn begin_epoch(&mut self) {
        self.composition = None;
        self.windows.clear();
        self.palettes.clear();
        self.objects.clear();
    }

    pub fn update_composition(&mut self, pcs: &'a PresentationCompositionSegment) {

        if pcs.composition_state == CompositionState::EpochStart {
            debug!(
                "epoch start at pts {} drops {} palettes and {} objects",
                pcs.pts,
                self.palettes.len(),
                self.objects.len(),
            );
            self.begin_epoch();
        }

        self.composition = Some(pcs);
    }

    pub fn update_windows(&mut self, wds: &'a WindowDefinitionSegment) {
        for window in &wds.windows {
            self.windows.insert(window.id, window);
        }
    }

    pub fn update_palette(&mut self, pds: &'a PaletteDefinitionSegment) -> PgsResult<()> {

        self.palettes.insert(pds.id, pds);

        if self.palettes.len() > MAX_PALETTES {
            return Err(LimitError::TooManyPalettes { limit: MAX_PALETTES }.into())
        }

        Ok(())
    }

    pub fn update_object(&mut self, ods: &'a ObjectDefinitionSegment) -> PgsResult<()> {

        self.objects.insert(ods.id, ods);

        if self.objects.len() > MAX_OBJECTS {
            return Err(LimitError::TooManyObjects { limit: MAX_OBJECTS }.into())
        }

        Ok(())
    }

    /// Applies a single segment.
    pub fn update_segment(&mut self, segment: &'a Segment) -> PgsResult<()> {
        match segment {
            Segment::PresentationComposition(pcs) => self.update_composition(pcs),
            Segment::WindowDefinition(wds) => self.update_windows(wds),
            Segment::PaletteDefinition(pds) => self.update_palette(pds)?,
            Segment::ObjectDefinition(ods) => self.update_object(ods)?,
            Segment::End(_) => {}
        }

        Ok(())
    }

    /// Applies a whole display set, then checks that its composition only references what is
    /// cached.
    pub fn update(&mut self, display_set: &'a DisplaySet) -> PgsResult<()> {

        self.update_composition(&display_set.pcs);
        self.update_windows(&display_set.wds);

        for pds in &display_set.palettes {
            self.update_palette(pds)?;
        }
        for ods in &display_set.objects {
            self.update_object(ods)?;
        }

        let pcs = &display_set.pcs;

        if pcs.palette_update && !self.palettes.contains_key(&pcs.palette_id) {
            return Err(StructuralError::UnknownPaletteReference(pcs.palette_id).into())
        }
        if let Some(comp_obj) = pcs.composition_objects.iter()
            .find(|comp_obj| !self.objects.contains_key(&comp_obj.object_id)) {
            return Err(StructuralError::UnknownObjectReference(comp_obj.object_id).into())
        }

        Ok(())
    }

    /// The composition most recently applied in this epoch.
    pub fn composition(&self) -> Option<&'a PresentationCompositionSegment> {
        self.composition
    }

    pub fn window(&self, id: u8) -> Option<&'a WindowDefinition> {
        self.windows.get(&id).copied()
    }

    pub fn palette(&self, id: u8) -> Option<&'a PaletteDefinitionSegment> {
        self.palettes.get(&id).copied()
    }

    pub fn object(&self, id: u16) -> Option<&'a ObjectDefinitionSegment> {
        self.objects.get(&id).copied()
    }

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
