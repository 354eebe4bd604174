/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Operates on individual segments.
//!
//! # Overview
//!
//! A segment is the most fundamental data structure within a PGS bitstream. Multiple segments
//! come together in a well-defined manner to form a display set (DS).
//!
//! There are five types that typically appear in this order:
//!
//! 1. Presentation Composition Segment (PCS)
//! 2. Window Definition Segment (WDS)
//! 3. Palette Definition Segment (PDS)
//! 4. Object Definition Segment (ODS)
//! 5. End Segment (ES)
//!
//! Something the fives types have in common is that each one defines both PTS and DTS
//! timestamps. They are typically identical within a given DS.
//!
//! ## Presentation Composition Segment (PCS)
//!
//! A PCS signals the start of a new display set (DS). It also defines properties such as the
//! role of the DS within the larger epoch, the screen resolution, and initial mappings of
//! objects to windows.
//!
//! ## Window Definition Segment (WDS)
//!
//! A WDS defines the areas of the screen that will be used to show objects during the larger
//! epoch. As a single WDS can define multiple windows, each DS should only have one.
//!
//! ## Palette Definition Segment (PDS)
//!
//! A PDS contains a list of YCbCrA values with each one having a unique ID. A single DS can
//! have multiple PDS segments.
//!
//! ## Object Definition Segment (ODS)
//!
//! An ODS defines a sequence of pixels with each pixel consisting of a single ID. These IDs map
//! back to the pixel values encountered in earlier PDS segments. An object too large for one
//! segment is split across several consecutive ODS fragments on the wire; this module only
//! surfaces the reassembled object.
//!
//! ## End Segment (ES)
//!
//! An ES signals that the current DS has come to an end.


pub mod fragment;

mod segmentread;
mod segmentwrite;

pub use segmentread::*;
pub use segmentwrite::*;

use super::{
    buffer::Layout,
    image::RgbaImage,
};
use std::convert::TryFrom;

/// The two bytes ("PG") that open every segment.
pub const MAGIC_NUMBER: u64 = 0x5047;

/// The largest payload a single segment can declare.
pub const MAX_SEGMENT_SIZE: usize = 0xFFFF;

/// The largest number of composition objects a single PCS may carry.
pub const MAX_COMPOSITION_OBJECTS: usize = 2;

/// The largest amount of RLE data a single object can carry; its 24-bit length field also
/// counts the width and height.
pub const MAX_OBJECT_DATA_SIZE: usize = 0xFF_FFFF - 4;

/// Magic number, PTS, DTS, kind, payload size.
pub(crate) const HEADER_LAYOUT: Layout<5> = [2, 4, 4, 1, 2];
/// Width, height, frame rate, composition number, state, palette update flag, palette ID,
/// object count.
pub(crate) const PCS_LAYOUT: Layout<8> = [2, 2, 1, 2, 1, 1, 1, 1];
/// Object ID, window ID, cropped flag, X, Y.
pub(crate) const COMPOSITION_OBJECT_LAYOUT: Layout<5> = [2, 1, 1, 2, 2];
/// X, Y, width, height.
pub(crate) const CROP_LAYOUT: Layout<4> = [2, 2, 2, 2];
pub(crate) const WDS_LAYOUT: Layout<1> = [1];
/// ID, X, Y, width, height.
pub(crate) const WINDOW_LAYOUT: Layout<5> = [1, 2, 2, 2, 2];
/// ID, version.
pub(crate) const PDS_LAYOUT: Layout<2> = [1, 1];
/// ID, Y, Cr, Cb, alpha.
pub(crate) const PALETTE_ENTRY_LAYOUT: Layout<5> = [1, 1, 1, 1, 1];
/// ID, version, sequence flag.
pub(crate) const ODS_LAYOUT: Layout<3> = [2, 1, 1];
/// Data length, width, height.
pub(crate) const OBJECT_DATA_LAYOUT: Layout<3> = [3, 2, 2];

/// Identifies the kind of a segment by its one-byte tag.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum SegmentKind {
    PaletteDefinition = 0x14,
    ObjectDefinition = 0x15,
    PresentationComposition = 0x16,
    WindowDefinition = 0x17,
    End = 0x80,
}

impl SegmentKind {

    /// Every segment kind paired with its tag.
    pub const TABLE: [(u8, SegmentKind); 5] = [
        (0x14, SegmentKind::PaletteDefinition),
        (0x15, SegmentKind::ObjectDefinition),
        (0x16, SegmentKind::PresentationComposition),
        (0x17, SegmentKind::WindowDefinition),
        (0x80, SegmentKind::End),
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::PaletteDefinition => "PDS",
            SegmentKind::ObjectDefinition => "ODS",
            SegmentKind::PresentationComposition => "PCS",
            SegmentKind::WindowDefinition => "WDS",
            SegmentKind::End => "END",
        }
    }
}

impl TryFrom<u8> for SegmentKind {

    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::TABLE.iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|&(_, kind)| kind)
            .ok_or(tag)
    }
}

/// Represents a PGS segment.
#[derive(Clone, Debug, Hash, PartialEq)]
pub enum Segment {
    /// Represents a Presentation Composition Segment (PCS).
    PresentationComposition(PresentationCompositionSegment),
    /// Represents a Window Definition Segment (WDS).
    WindowDefinition(WindowDefinitionSegment),
    /// Represents a Palette Definition Segment (PDS).
    PaletteDefinition(PaletteDefinitionSegment),
    /// Represents a fully reassembled Object Definition Segment (ODS).
    ObjectDefinition(ObjectDefinitionSegment),
    /// Represents an End Segment (ES).
    End(EndSegment),
}

impl Segment {

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::PresentationComposition(_) => SegmentKind::PresentationComposition,
            Segment::WindowDefinition(_) => SegmentKind::WindowDefinition,
            Segment::PaletteDefinition(_) => SegmentKind::PaletteDefinition,
            Segment::ObjectDefinition(_) => SegmentKind::ObjectDefinition,
            Segment::End(_) => SegmentKind::End,
        }
    }

    pub fn pts(&self) -> u32 {
        match self {
            Segment::PresentationComposition(pcs) => pcs.pts,
            Segment::WindowDefinition(wds) => wds.pts,
            Segment::PaletteDefinition(pds) => pds.pts,
            Segment::ObjectDefinition(ods) => ods.pts,
            Segment::End(es) => es.pts,
        }
    }

    pub fn dts(&self) -> u32 {
        match self {
            Segment::PresentationComposition(pcs) => pcs.dts,
            Segment::WindowDefinition(wds) => wds.dts,
            Segment::PaletteDefinition(pds) => pds.dts,
            Segment::ObjectDefinition(ods) => ods.dts,
            Segment::End(es) => es.dts,
        }
    }
}

/// Defines the role of a PCS (and thereby the associated DS) within an epoch.
///
/// On the wire, the state occupies the top two bits of its byte.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CompositionState {
    /// This updates the composition that is on the screen. This is typically used to clear the
    /// current composition from the screen by defining a PCS with no composition objects,
    /// thereby effectively closing out the current epoch. But other things like palette updates
    /// and object substitution within a window can also be done. Previously defined objects
    /// and palettes remain valid.
    Normal,
    /// Used to refresh the screen with the current composition. That is, the associated DS
    /// should redefine the same windows, objects, and palettes as the `EpochStart` DS. This
    /// allows a player to seek past an `EpochStart` and land in the middle of an epoch, while
    /// still being able to show the relevant composition once the `AcquisitionPoint` is
    /// encountered.
    AcquisitionPoint,
    /// Indicates that the associated PCS (and the DS it belongs to) defines the start of a new
    /// epoch. As such, the associated DS should contain all other segments necessary to render
    /// a composition onto the screen, and every previously cached palette and object is
    /// discarded.
    EpochStart,
    /// Continues an epoch across a discontinuity in the stream.
    EpochContinue,
}

impl CompositionState {

    pub fn flag(self) -> u8 {
        match self {
            CompositionState::Normal => 0x00,
            CompositionState::AcquisitionPoint => 0x40,
            CompositionState::EpochStart => 0x80,
            CompositionState::EpochContinue => 0xC0,
        }
    }
}

impl Default for CompositionState {
    fn default() -> Self { Self::EpochStart }
}

/// Defines a fragment's role within a possibly multi-part object.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Sequence {
    /// This fragment is discrete and carries the whole object.
    Single,
    /// This fragment is the first portion in a multi-part object.
    First,
    /// This fragment continues a multi-part object.
    Middle,
    /// This fragment is the last portion in a multi-part object.
    Last,
}

impl Sequence {

    pub fn flag(self) -> u8 {
        match self {
            Sequence::Single => 0xC0,
            Sequence::First => 0x80,
            Sequence::Middle => 0x00,
            Sequence::Last => 0x40,
        }
    }

    /// Whether this fragment opens an object and therefore carries its dimensions.
    pub fn is_first(self) -> bool {
        matches!(self, Sequence::Single | Sequence::First)
    }

    /// Whether this fragment closes an object.
    pub fn is_last(self) -> bool {
        matches!(self, Sequence::Single | Sequence::Last)
    }
}

impl Default for Sequence {
    fn default() -> Self { Self::Single }
}

/// Defines a Presentation Composition Segment (PCS).
///
/// A PCS marks the beginning of a display set (DS).
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct PresentationCompositionSegment {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
    /// The width of the display in pixels. This value should be consistent within a
    /// presentation.
    pub width: u16,
    /// The height of the display in pixels. This value should be consistent within a
    /// presentation.
    pub height: u16,
    /// This value should be set to `0x10` and can typically be ignored.
    pub frame_rate: u8,
    /// Incremented every time a graphics update occurs.
    pub composition_number: u16,
    pub composition_state: CompositionState,
    /// Whether this DS only swaps the palette of what is already on screen.
    pub palette_update: bool,
    /// The palette used by this composition. Kept even when `palette_update` is unset so that
    /// the segment re-serializes byte for byte.
    pub palette_id: u8,
    /// At most [`MAX_COMPOSITION_OBJECTS`] entries.
    pub composition_objects: Vec<CompositionObject>,
}

/// Places an object within a window.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct CompositionObject {
    pub object_id: u16,
    pub window_id: u8,
    pub x: u16,
    pub y: u16,
    pub crop: Option<Crop>,
}

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct Crop {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct WindowDefinitionSegment {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
    pub windows: Vec<WindowDefinition>,
}

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct WindowDefinition {
    pub id: u8,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct PaletteDefinitionSegment {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
    pub id: u8,
    pub version: u8,
    pub entries: Vec<PaletteEntry>,
}

/// A single YCbCrA color.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct PaletteEntry {
    pub id: u8,
    pub y: u8,
    pub cr: u8,
    pub cb: u8,
    pub alpha: u8,
}

/// Defines a complete object, reassembled from however many fragments carried it.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct ObjectDefinitionSegment {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
    pub id: u16,
    pub version: u8,
    pub width: u16,
    pub height: u16,
    /// The run-length encoded pixel data.
    pub data: Vec<u8>,
    /// A replacement image staged by an external editor. Never serialized.
    pub image: Option<RgbaImage>,
    /// Width of the staged image minus the width of the object. Never serialized.
    pub width_delta: i32,
    /// Height of the staged image minus the height of the object. Never serialized.
    pub height_delta: i32,
}

#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct EndSegment {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
}
