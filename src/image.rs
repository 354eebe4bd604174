/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Decoded pixel planes and the boundary to external image editors.
//!
//! An object's RLE data decodes into a [`Bitmap`] of palette indices, which together with an
//! [`RgbaPalette`] yields an [`RgbaImage`]. Going the other way, replacement images are staged
//! on their objects with [`ObjectDefinitionSegment::set_image`] and later mapped back onto a
//! shared palette by [`quantize`].


use super::{
    color::entry_to_rgba,
    error::{LimitError, PgsResult, StructuralError},
    rle,
    segment::{ObjectDefinitionSegment, PaletteDefinitionSegment, PaletteEntry},
};
use std::collections::{BTreeSet, HashMap};

/// The number of entries a palette can address.
pub const PALETTE_SIZE: usize = 256;

/// The color reserved for palette index 0 whenever a palette is rebuilt.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A rectangular plane of palette indices, stored row by row.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Bitmap {

    pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> PgsResult<Self> {

        if pixels.len() != width as usize * height as usize {
            return Err(
                StructuralError::BitmapDimensionMismatch {
                    width: width as usize,
                    height: height as usize,
                    actual_width: if height == 0 { pixels.len() } else { pixels.len() / height as usize },
                    actual_height: height as usize,
                }.into()
            )
        }

        Ok(Self { width, height, pixels })
    }

    /// Decodes RLE data, which must describe exactly `height` rows of `width` pixels.
    pub fn from_rle(width: u16, height: u16, data: &[u8]) -> PgsResult<Self> {

        let rows = rle::decode_bounded(data, width as usize, height as usize)?;
        let mismatch = |actual_width: usize| StructuralError::BitmapDimensionMismatch {
            width: width as usize,
            height: height as usize,
            actual_width,
            actual_height: rows.len(),
        };

        if let Some(row) = rows.iter().find(|row| row.len() != width as usize) {
            return Err(mismatch(row.len()).into())
        }
        if rows.len() != height as usize {
            return Err(mismatch(width as usize).into())
        }

        Ok(Self { width, height, pixels: rows.concat() })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(self.width.max(1) as usize)
    }

    pub fn to_rle(&self) -> Vec<u8> {
        rle::encode(&self.rows().collect::<Vec<&[u8]>>())
    }

    pub fn to_rgba(&self, palette: &RgbaPalette) -> RgbaImage {
        RgbaImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&index| palette.color(index)).collect(),
        }
    }
}

/// Maps all 256 palette indices to RGBA. Indices a PDS leaves undefined are fully transparent.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RgbaPalette {
    colors: Vec<[u8; 4]>,
}

impl RgbaPalette {

    pub fn from_entries(entries: &[PaletteEntry]) -> Self {

        let mut colors = vec![TRANSPARENT; PALETTE_SIZE];

        for entry in entries {
            colors[entry.id as usize] = entry_to_rgba(entry);
        }

        Self { colors }
    }

    pub fn from_pds(pds: &PaletteDefinitionSegment) -> Self {
        Self::from_entries(&pds.entries)
    }

    pub fn color(&self, index: u8) -> [u8; 4] {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }
}

impl Default for RgbaPalette {
    fn default() -> Self {
        Self { colors: vec![TRANSPARENT; PALETTE_SIZE] }
    }
}

/// A rectangular plane of RGBA pixels, stored row by row.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RgbaImage {
    width: u16,
    height: u16,
    pixels: Vec<[u8; 4]>,
}

impl RgbaImage {

    pub fn new(width: u16, height: u16, pixels: Vec<[u8; 4]>) -> PgsResult<Self> {

        if pixels.len() != width as usize * height as usize {
            return Err(
                StructuralError::BitmapDimensionMismatch {
                    width: width as usize,
                    height: height as usize,
                    actual_width: if height == 0 { pixels.len() } else { pixels.len() / height as usize },
                    actual_height: height as usize,
                }.into()
            )
        }

        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }
}

/// An object decoded against the palette its composition selects.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedObject {
    /// Position of the carrying display set within the file.
    pub display_set: usize,
    pub id: u16,
    pub pts: u32,
    pub bitmap: Bitmap,
    pub palette: RgbaPalette,
}

impl DecodedObject {
    pub fn to_rgba(&self) -> RgbaImage {
        self.bitmap.to_rgba(&self.palette)
    }
}

impl ObjectDefinitionSegment {

    /// Decodes this object's RLE data into palette indices.
    pub fn decode(&self) -> PgsResult<Bitmap> {
        Bitmap::from_rle(self.width, self.height, &self.data)
    }

    /// Stages a replacement image, recording how its size differs from the current object.
    ///
    /// Nothing is re-encoded until the display set's palette is rebuilt.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.width_delta = image.width as i32 - self.width as i32;
        self.height_delta = image.height as i32 - self.height as i32;
        self.image = Some(image);
    }
}

/// Maps several images onto one shared palette.
///
/// Index 0 is always [`TRANSPARENT`]. Each image then contributes its colors in sorted order,
/// skipping any already present. Returns the palette's colors and one index plane per image.
pub fn quantize(images: &[&RgbaImage]) -> PgsResult<(Vec<[u8; 4]>, Vec<Bitmap>)> {

    let mut colors = vec![TRANSPARENT];
    let mut lookup = HashMap::<[u8; 4], u8>::new();

    lookup.insert(TRANSPARENT, 0);

    for image in images {

        let distinct = image.pixels.iter().copied().collect::<BTreeSet<[u8; 4]>>();

        for color in distinct {
            if lookup.contains_key(&color) {
                continue
            }
            if colors.len() == PALETTE_SIZE {
                return Err(LimitError::TooManyColors { limit: PALETTE_SIZE }.into())
            }
            lookup.insert(color, colors.len() as u8);
            colors.push(color);
        }
    }

    let bitmaps = images.iter()
        .map(|image| Bitmap {
            width: image.width,
            height: image.height,
            pixels: image.pixels.iter()
                .map(|color| lookup.get(color).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    Ok((colors, bitmaps))
}
