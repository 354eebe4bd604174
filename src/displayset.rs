/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Groups segments into display sets.
//!
//! A display set (DS) is one atomic update of what is on screen. It carries exactly one PCS,
//! exactly one WDS, and exactly one END, along with any number of palette and object
//! definitions. Palettes and objects keep the order in which they appeared, which is also the
//! order in which they are written back out.

#[cfg(test)]
mod tests;

mod displaysetread;
mod displaysetwrite;

pub use displaysetread::*;
pub use displaysetwrite::*;

use super::{
    color::rgba_to_entry,
    error::{PgsResult, StructuralError},
    image::{quantize, RgbaImage, RgbaPalette},
    segment::{
        EndSegment,
        ObjectDefinitionSegment,
        PaletteDefinitionSegment,
        PresentationCompositionSegment,
        Segment,
        SegmentKind,
        WindowDefinitionSegment,
    },
};
use std::collections::BTreeSet;

/// The ID given to a palette regenerated by [`DisplaySet::rebuild_palette`].
pub const REBUILT_PALETTE_ID: u8 = 0;

/// The version given to a palette regenerated by [`DisplaySet::rebuild_palette`].
pub const REBUILT_PALETTE_VERSION: u8 = 1;

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct DisplaySet {
    pub pcs: PresentationCompositionSegment,
    pub wds: WindowDefinitionSegment,
    pub palettes: Vec<PaletteDefinitionSegment>,
    pub objects: Vec<ObjectDefinitionSegment>,
    pub end: EndSegment,
}

impl DisplaySet {

    /// Builds a display set from its segments.
    ///
    /// `index` is the display set's position within its stream and only serves error reporting.
    pub fn from_segments(index: usize, segments: Vec<Segment>) -> PgsResult<Self> {

        let mut pcs = Vec::new();
        let mut wds = Vec::new();
        let mut end = Vec::new();
        let mut palettes = Vec::<PaletteDefinitionSegment>::new();
        let mut objects = Vec::<ObjectDefinitionSegment>::new();
        let mut palette_ids = BTreeSet::new();
        let mut object_ids = BTreeSet::new();

        for segment in segments {
            match segment {
                Segment::PresentationComposition(segment) => pcs.push(segment),
                Segment::WindowDefinition(segment) => wds.push(segment),
                Segment::End(segment) => end.push(segment),
                Segment::PaletteDefinition(pds) => {
                    if !palette_ids.insert(pds.id) {
                        return Err(StructuralError::DuplicatePaletteId { index, id: pds.id }.into())
                    }
                    palettes.push(pds);
                }
                Segment::ObjectDefinition(ods) => {
                    if !object_ids.insert(ods.id) {
                        return Err(StructuralError::DuplicateObjectId { index, id: ods.id }.into())
                    }
                    objects.push(ods);
                }
            }
        }

        Ok(
            DisplaySet {
                pcs: exactly_one(index, SegmentKind::PresentationComposition, pcs)?,
                wds: exactly_one(index, SegmentKind::WindowDefinition, wds)?,
                palettes,
                objects,
                end: exactly_one(index, SegmentKind::End, end)?,
            }
        )
    }

    /// Breaks the display set back down into segments in wire order.
    pub fn to_segments(&self) -> Vec<Segment> {

        let mut segments = Vec::with_capacity(3 + self.palettes.len() + self.objects.len());

        segments.push(Segment::PresentationComposition(self.pcs.clone()));
        segments.push(Segment::WindowDefinition(self.wds.clone()));
        segments.extend(self.palettes.iter().cloned().map(Segment::PaletteDefinition));
        segments.extend(self.objects.iter().cloned().map(Segment::ObjectDefinition));
        segments.push(Segment::End(self.end.clone()));

        segments
    }

    pub fn pts(&self) -> u32 {
        self.pcs.pts
    }

    pub fn dts(&self) -> u32 {
        self.pcs.dts
    }

    pub fn palette(&self, id: u8) -> Option<&PaletteDefinitionSegment> {
        self.palettes.iter().find(|pds| pds.id == id)
    }

    pub fn object(&self, id: u16) -> Option<&ObjectDefinitionSegment> {
        self.objects.iter().find(|ods| ods.id == id)
    }

    pub fn object_mut(&mut self, id: u16) -> Option<&mut ObjectDefinitionSegment> {
        self.objects.iter_mut().find(|ods| ods.id == id)
    }

    /// Re-encodes every object against one regenerated palette.
    ///
    /// Objects with a staged replacement image use it; the rest are decoded against the
    /// palette this display set's composition selects, which must then be defined here. The
    /// regenerated palette is always palette 0 at version 1. It replaces every PDS in the
    /// display set, the composition switches to it, and the composition stops being a
    /// palette-only update.
    pub fn rebuild_palette(&mut self) -> PgsResult<()> {

        let palette_id = self.pcs.palette_id;
        let current = self.palette(palette_id).map(RgbaPalette::from_pds);
        let mut images = Vec::<RgbaImage>::with_capacity(self.objects.len());

        for ods in &self.objects {
            let image = match (&ods.image, &current) {
                (Some(image), _) => image.clone(),
                (None, Some(palette)) => ods.decode()?.to_rgba(palette),
                (None, None) => return Err(StructuralError::MissingImage(ods.id).into()),
            };
            images.push(image);
        }

        let (colors, bitmaps) = quantize(&images.iter().collect::<Vec<&RgbaImage>>())?;

        for (ods, bitmap) in self.objects.iter_mut().zip(bitmaps.iter()) {
            ods.width = bitmap.width();
            ods.height = bitmap.height();
            ods.data = bitmap.to_rle();
            ods.image = None;
        }

        self.palettes = vec![
            PaletteDefinitionSegment {
                pts: self.pcs.pts,
                dts: self.pcs.dts,
                id: REBUILT_PALETTE_ID,
                version: REBUILT_PALETTE_VERSION,
                entries: colors.into_iter()
                    .enumerate()
                    .map(|(index, color)| rgba_to_entry(index as u8, color))
                    .collect(),
            },
        ];
        self.pcs.palette_id = REBUILT_PALETTE_ID;
        self.pcs.palette_update = false;

        Ok(())
    }
}

fn exactly_one<T>(index: usize, kind: SegmentKind, found: Vec<T>) -> PgsResult<T> {

    let count = found.len();
    let mut found = found.into_iter();

    match (found.next(), found.next()) {
        (Some(segment), None) => Ok(segment),
        _ => Err(StructuralError::DisplaySetMultiplicity { index, kind: kind.name(), count }.into()),
    }
}
