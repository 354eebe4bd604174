/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Converts between the YCbCr values stored in palettes and 8-bit RGB.
//!
//! Conversion uses the fixed full-range BT.601 coefficients. Results are clamped to `0..=255`
//! and truncated, so the two directions are close to, but not exact, inverses.


use super::segment::PaletteEntry;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct YcbcrPixel {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RgbPixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

pub fn rgb_pixel(input: YcbcrPixel) -> RgbPixel {

    let y = input.y as f64;
    let cb = input.cb as f64 - 128.0;
    let cr = input.cr as f64 - 128.0;

    RgbPixel {
        red:   clamp(y + 1.402 * cr),
        green: clamp(y - 0.344136 * cb - 0.714136 * cr),
        blue:  clamp(y + 1.772 * cb),
    }
}

pub fn ycbcr_pixel(input: RgbPixel) -> YcbcrPixel {

    let red = input.red as f64;
    let green = input.green as f64;
    let blue = input.blue as f64;

    YcbcrPixel {
        y:  clamp(0.299 * red + 0.587 * green + 0.114 * blue),
        cb: clamp(-0.16874 * red - 0.33126 * green + 0.5 * blue + 128.0),
        cr: clamp(0.5 * red - 0.41869 * green - 0.08131 * blue + 128.0),
    }
}

/// Converts a palette entry to an RGBA quadruple.
pub fn entry_to_rgba(entry: &PaletteEntry) -> [u8; 4] {

    let rgb = rgb_pixel(YcbcrPixel { y: entry.y, cb: entry.cb, cr: entry.cr });

    [rgb.red, rgb.green, rgb.blue, entry.alpha]
}

/// Converts an RGBA quadruple to the palette entry with the given ID.
pub fn rgba_to_entry(id: u8, rgba: [u8; 4]) -> PaletteEntry {

    let ycbcr = ycbcr_pixel(RgbPixel { red: rgba[0], green: rgba[1], blue: rgba[2] });

    PaletteEntry {
        id,
        y: ycbcr.y,
        cr: ycbcr.cr,
        cb: ycbcr.cb,
        alpha: rgba[3],
    }
}

fn clamp(value: f64) -> u8 {
    value.max(0.0).min(255.0) as u8
}
