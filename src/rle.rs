/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! The run-length scheme PGS uses for object pixel data.
//!
//! Each row of palette indices is encoded on its own and terminated with `00 00`. Within a
//! row, a nonzero byte is a single pixel of that color, and a zero byte opens a control
//! sequence:
//!
//! | Bytes               | Meaning                          |
//! |---------------------|----------------------------------|
//! | `00 00`             | end of row                       |
//! | `00 0L`             | `L` (1-63) pixels of color 0     |
//! | `00 4L LL`          | `L` (64-16383) pixels of color 0 |
//! | `00 8L CC`          | `L` (3-63) pixels of color `C`   |
//! | `00 CL LL CC`       | `L` (64-16383) pixels of color `C` |
//!
//! The encoder here is canonical: it always picks the same form for a given run, so that
//! re-encoding decoded data reproduces the original bytes.


use super::error::{PgsResult, StructuralError};

/// The longest run a single control sequence can describe.
pub const MAX_RUN_LENGTH: usize = 0x3FFF;

/// Encodes rows of palette indices.
///
/// Runs longer than [`MAX_RUN_LENGTH`] are split across consecutive control sequences. No rows
/// yields no bytes.
pub fn encode<R: AsRef<[u8]>>(rows: &[R]) -> Vec<u8> {

    let mut output = Vec::<u8>::new();

    for row in rows {

        let mut byte = 0_u8;
        let mut count = 0_usize;

        for &next_byte in row.as_ref() {
            if next_byte == byte && count > 0 {
                count += 1;
            } else {
                output_run(&mut output, byte, count);
                byte = next_byte;
                count = 1;
            }
        }

        output_run(&mut output, byte, count);
        output.push(0x00);
        output.push(0x00);
    }

    output
}

/// Decodes RLE data back into rows of palette indices.
///
/// Every row, including the last, must be terminated.
pub fn decode(data: &[u8]) -> PgsResult<Vec<Vec<u8>>> {
    decode_rows(data, None)
}

/// Decodes RLE data that must fit within `width` by `height` pixels.
///
/// Fails with `BitmapDimensionMismatch` as soon as a row would grow past `width` or more than
/// `height` rows begin, before any pixels are allocated for them. Rows may still come out
/// short.
pub fn decode_bounded(data: &[u8], width: usize, height: usize) -> PgsResult<Vec<Vec<u8>>> {
    decode_rows(data, Some((width, height)))
}

fn decode_rows(data: &[u8], bounds: Option<(usize, usize)>) -> PgsResult<Vec<Vec<u8>>> {

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut row_open = false;
    let mut offset = 0;

    while offset < data.len() {

        let first = data[offset];

        if first != 0x00 {
            check_bounds(bounds, rows.len(), row.len() + 1)?;
            row.push(first);
            row_open = true;
            offset += 1;
            continue
        }

        let check = control_byte(data, offset, 1)?;
        let (color, length, advance) = match check >> 6 {
            0b00 if check == 0 => {
                check_bounds(bounds, rows.len(), row.len())?;
                rows.push(std::mem::take(&mut row));
                row_open = false;
                offset += 2;
                continue
            }
            0b00 => (0, check as usize, 2),
            0b01 => (0, long_length(check, control_byte(data, offset, 2)?), 3),
            0b10 => (control_byte(data, offset, 2)?, (check & 0x3F) as usize, 3),
            _ => {
                let length = long_length(check, control_byte(data, offset, 2)?);
                (control_byte(data, offset, 3)?, length, 4)
            }
        };

        check_bounds(bounds, rows.len(), row.len() + length)?;
        row.resize(row.len() + length, color);
        row_open = true;
        offset += advance;
    }

    if row_open {
        return Err(StructuralError::MalformedRle(data.len()).into())
    }

    Ok(rows)
}

fn output_run(output: &mut Vec<u8>, byte: u8, mut count: usize) {

    while count > MAX_RUN_LENGTH {
        output_sequence(output, byte, MAX_RUN_LENGTH);
        count -= MAX_RUN_LENGTH;
    }

    output_sequence(output, byte, count);
}

fn output_sequence(output: &mut Vec<u8>, byte: u8, count: usize) {

    if byte == 0x00 {
        match count {
            0 => {}
            1..=63 => {
                output.push(0x00);
                output.push(count as u8);
            }
            _ => {
                output.push(0x00);
                output.push(0x40 | (count >> 8) as u8);
                output.push((count & 0xFF) as u8);
            }
        }
    } else {
        match count {
            0 => {}
            1 => {
                output.push(byte);
            }
            2 => {
                output.push(byte);
                output.push(byte);
            }
            3..=63 => {
                output.push(0x00);
                output.push(0x80 | count as u8);
                output.push(byte);
            }
            _ => {
                output.push(0x00);
                output.push(0xC0 | (count >> 8) as u8);
                output.push((count & 0xFF) as u8);
                output.push(byte);
            }
        }
    }
}

/// Fails if row `row` would hold `row_width` pixels outside of `bounds`.
fn check_bounds(bounds: Option<(usize, usize)>, row: usize, row_width: usize) -> PgsResult<()> {
    match bounds {
        Some((width, height)) if row_width > width || row >= height => Err(
            StructuralError::BitmapDimensionMismatch {
                width,
                height,
                actual_width: row_width,
                actual_height: row + 1,
            }.into()
        ),
        _ => Ok(()),
    }
}

fn long_length(check: u8, low: u8) -> usize {
    (((check & 0x3F) as usize) << 8) | low as usize
}

/// Reads byte `index` of the control sequence starting at `start`.
fn control_byte(data: &[u8], start: usize, index: usize) -> PgsResult<u8> {
    data.get(start + index)
        .copied()
        .ok_or_else(|| StructuralError::MalformedRle(start).into())
}
