/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Lossless parsing and re-encoding of Presentation Graphics Stream (PGS) subtitles.
//!
//! A PGS bitstream, as found in Blu-ray `.sup` files, is a flat sequence of segments. Segments
//! are grouped into display sets, and display sets are grouped into epochs. This crate reads
//! such a stream into a [`PgsFile`], validates it against the per-epoch limits of the format,
//! and writes it back out byte for byte. Object bitmaps can be decoded to RGBA images and
//! replaced before writing.
//!
//! ```no_run
//! use pgs_codec::PgsFile;
//!
//! # fn main() -> pgs_codec::PgsResult<()> {
//! let bytes = std::fs::read("subtitles.sup").unwrap();
//! let file = PgsFile::from_bytes(&bytes)?;
//!
//! assert_eq!(file.write()?, bytes);
//! # Ok(())
//! # }
//! ```


pub mod buffer;
pub mod color;
pub mod context;
pub mod displayset;
pub mod error;
pub mod file;
pub mod image;
pub mod rle;
pub mod segment;

pub use context::EpochContext;
pub use displayset::{DisplaySet, ReadDisplaySetExt, WriteDisplaySetExt};
pub use error::{PgsError, PgsResult};
pub use file::PgsFile;
pub use image::{Bitmap, DecodedObject, RgbaImage, RgbaPalette};
pub use segment::{ReadSegmentExt, Segment, SegmentKind, WriteSegmentExt};

/// Ticks per second of the PTS/DTS clock.
pub const CLOCK_RATE: u32 = 90_000;

/// Renders a 90 kHz timestamp as `HH:MM:SS.mmm`.
pub fn ts_to_timestamp(ticks: u32) -> String {

    let millis = ticks as u64 * 1_000 / CLOCK_RATE as u64;
    let seconds = millis / 1_000;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        seconds / 3_600,
        seconds / 60 % 60,
        seconds % 60,
        millis % 1_000,
    )
}
