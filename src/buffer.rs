/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! A positioned byte buffer that reads and writes fixed big-endian field layouts.
//!
//! Every structure in a PGS bitstream is a sequence of unsigned big-endian fields with fixed
//! widths. A [`Layout`] lists those widths, and [`PgsBuffer::unpack`] / [`PgsBuffer::pack`]
//! move a whole layout in one call.

#[cfg(test)]
mod tests;

use super::error::{BufferError, PgsResult};
use std::borrow::Cow;
use byteorder::{BigEndian, ByteOrder};

/// The byte widths of consecutive big-endian fields.
pub type Layout<const N: usize> = [usize; N];

/// Returns the total number of bytes occupied by a layout.
pub const fn layout_size<const N: usize>(layout: &Layout<N>) -> usize {

    let mut size = 0;
    let mut index = 0;

    while index < N {
        size += layout[index];
        index += 1;
    }

    size
}

/// A byte buffer with a read/write position.
///
/// A read-only buffer borrows its bytes and rejects writes. A writable buffer owns its bytes
/// and grows when written past its current end.
#[derive(Clone, Debug)]
pub struct PgsBuffer<'a> {
    data: Cow<'a, [u8]>,
    position: usize,
    read_only: bool,
}

impl<'a> PgsBuffer<'a> {

    /// Opens a read-only buffer over existing bytes, positioned at the start.
    pub fn read_only(bytes: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(bytes),
            position: 0,
            read_only: true,
        }
    }

    /// Opens an empty, writable buffer.
    pub fn writable() -> PgsBuffer<'static> {
        PgsBuffer {
            data: Cow::Owned(Vec::new()),
            position: 0,
            read_only: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of bytes between the current position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Moves the position. The position may equal the length, but never exceed it.
    pub fn seek(&mut self, position: usize) -> PgsResult<()> {

        if position > self.data.len() {
            return Err(BufferError::InvalidPosition { position, length: self.data.len() }.into())
        }

        self.position = position;

        Ok(())
    }

    /// Checks whether `size` more bytes can be read. A size of zero is treated as one.
    pub fn can_read(&self, size: usize) -> bool {
        self.remaining() >= size.max(1)
    }

    /// Reads exactly `size` bytes and advances past them.
    pub fn read(&mut self, size: usize) -> PgsResult<&[u8]> {

        if size == 0 {
            return Err(BufferError::ZeroLengthAccess.into())
        }

        let available = self.remaining();

        if size > available {
            return Err(BufferError::TruncatedInput { requested: size, available }.into())
        }

        let start = self.position;

        self.position += size;

        Ok(&self.data[start..self.position])
    }

    /// Reads one value per field of `layout`.
    pub fn unpack<const N: usize>(&mut self, layout: &Layout<N>) -> PgsResult<[u64; N]> {

        check_layout(layout)?;

        let bytes = self.read(layout_size(layout))?;
        let mut values = [0u64; N];
        let mut offset = 0;

        for (value, &width) in values.iter_mut().zip(layout.iter()) {
            *value = BigEndian::read_uint(&bytes[offset..], width);
            offset += width;
        }

        Ok(values)
    }

    /// Writes `bytes` at the current position, overwriting and then extending the buffer.
    ///
    /// Returns the number of bytes written.
    pub fn write(&mut self, bytes: &[u8]) -> PgsResult<usize> {

        if self.read_only {
            return Err(BufferError::ReadOnlyViolation.into())
        }
        if bytes.is_empty() {
            return Err(BufferError::ZeroLengthAccess.into())
        }

        let start = self.position;
        let end = start + bytes.len();
        let data = self.data.to_mut();

        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(bytes);
        self.position = end;

        Ok(bytes.len())
    }

    /// Writes one value per field of `layout`.
    ///
    /// Returns the number of bytes written.
    pub fn pack<const N: usize>(
        &mut self,
        layout: &Layout<N>,
        values: [u64; N],
    ) -> PgsResult<usize> {

        check_layout(layout)?;

        let mut bytes = vec![0u8; layout_size(layout)];
        let mut offset = 0;

        for (&value, &width) in values.iter().zip(layout.iter()) {
            if width < 8 && value >> (width * 8) != 0 {
                return Err(BufferError::FieldOverflow { value, width }.into())
            }
            BigEndian::write_uint(&mut bytes[offset..], value, width);
            offset += width;
        }

        self.write(&bytes)
    }

    /// Gives up the buffer, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_owned()
    }
}

fn check_layout<const N: usize>(layout: &Layout<N>) -> PgsResult<()> {

    match layout.iter().find(|&&width| width == 0 || width > 8) {
        Some(&width) => Err(BufferError::InvalidFieldWidth(width).into()),
        None => Ok(()),
    }
}
