/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;
use super::super::error::PgsError;

const HEADER_LAYOUT: Layout<5> = [2, 4, 4, 1, 2];

#[test]
fn test_layout_size() {
    assert_eq!(layout_size(&HEADER_LAYOUT), 13);
    assert_eq!(layout_size(&[3, 2, 2]), 7);
}

#[test]
fn test_read_exact() {

    let bytes = [1, 2, 3, 4, 5];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert_eq!(buffer.read(2).unwrap(), &[1, 2]);
    assert_eq!(buffer.position(), 2);
    assert_eq!(buffer.read(3).unwrap(), &[3, 4, 5]);
    assert!(!buffer.can_read(1));
}

#[test]
fn test_read_past_end() {

    let bytes = [1, 2, 3];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert_eq!(
        buffer.read(4),
        Err(PgsError::Buffer {
            source: BufferError::TruncatedInput { requested: 4, available: 3 },
        }),
    );
    assert_eq!(buffer.position(), 0);
}

#[test]
fn test_read_zero_length() {

    let bytes = [1, 2, 3];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert_eq!(
        buffer.read(0),
        Err(PgsError::Buffer { source: BufferError::ZeroLengthAccess }),
    );
}

#[test]
fn test_unpack_header() {

    let bytes = [
        0x50, 0x47,
        0x00, 0x01, 0x5F, 0x90,
        0x00, 0x00, 0x00, 0x00,
        0x16,
        0x00, 0x13,
    ];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert_eq!(
        buffer.unpack(&HEADER_LAYOUT).unwrap(),
        [0x5047, 90_000, 0, 0x16, 0x13],
    );
    assert_eq!(buffer.remaining(), 0);
}

#[test]
fn test_unpack_u24() {

    let bytes = [0x01, 0x02, 0x03, 0x00, 0x10];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert_eq!(buffer.unpack(&[3, 2]).unwrap(), [0x010203, 0x0010]);
}

#[test]
fn test_pack_extends_length() {

    let mut buffer = PgsBuffer::writable();

    assert_eq!(buffer.pack(&[1, 2], [0xAB, 0xCDEF]).unwrap(), 3);
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.pack(&[3], [0x123456]).unwrap(), 3);
    assert_eq!(buffer.len(), 6);
    assert_eq!(buffer.into_bytes(), vec![0xAB, 0xCD, 0xEF, 0x12, 0x34, 0x56]);
}

#[test]
fn test_pack_overflow() {

    let mut buffer = PgsBuffer::writable();

    assert_eq!(
        buffer.pack(&[1], [0x100]),
        Err(PgsError::Buffer { source: BufferError::FieldOverflow { value: 0x100, width: 1 } }),
    );
    assert!(buffer.is_empty());
}

#[test]
fn test_invalid_field_width() {

    let mut buffer = PgsBuffer::writable();

    assert_eq!(
        buffer.pack(&[0], [0]),
        Err(PgsError::Buffer { source: BufferError::InvalidFieldWidth(0) }),
    );
}

#[test]
fn test_write_read_only() {

    let bytes = [1, 2, 3];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert!(buffer.is_read_only());
    assert_eq!(
        buffer.write(&[4]),
        Err(PgsError::Buffer { source: BufferError::ReadOnlyViolation }),
    );
}

#[test]
fn test_write_overwrites_then_extends() {

    let mut buffer = PgsBuffer::writable();

    buffer.write(&[1, 2, 3, 4]).unwrap();
    buffer.seek(2).unwrap();
    buffer.write(&[9, 9, 9]).unwrap();

    assert_eq!(buffer.position(), 5);
    assert_eq!(buffer.into_bytes(), vec![1, 2, 9, 9, 9]);
}

#[test]
fn test_seek_out_of_range() {

    let bytes = [1, 2, 3];
    let mut buffer = PgsBuffer::read_only(&bytes);

    assert!(buffer.seek(3).is_ok());
    assert_eq!(
        buffer.seek(4),
        Err(PgsError::Buffer { source: BufferError::InvalidPosition { position: 4, length: 3 } }),
    );
}
