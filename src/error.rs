/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Error types shared by every stage of the parse and write passes.
//!
//! Every error is fatal to the pass that raised it. A malformed stream invalidates all offsets
//! that follow it, so nothing is retried, repaired, or skipped.

use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for PGS operations.
pub type PgsResult<T> = Result<T, PgsError>;

/// The error type for all PGS operations.
///
/// Errors fall into four kinds, each wrapping a more detailed cause.
#[derive(ThisError, Clone, Debug, PartialEq, Eq)]
pub enum PgsError {
    /// The bitstream violates the structure of the format.
    #[error("structural error: {source}")]
    Structural {
        /// The specific violation.
        #[from]
        source: StructuralError,
    },
    /// An object split across several segments could not be reassembled.
    #[error("fragmentation error: {source}")]
    Fragmentation {
        /// The specific violation.
        #[from]
        source: FragmentationError,
    },
    /// A protocol-mandated ceiling was exceeded.
    #[error("limit exceeded: {source}")]
    LimitExceeded {
        /// The ceiling that was exceeded.
        #[from]
        source: LimitError,
    },
    /// The underlying byte buffer was misused or ran out of data.
    #[error("buffer error: {source}")]
    Buffer {
        /// The specific misuse.
        #[from]
        source: BufferError,
    },
}

/// Errors raised by [`PgsBuffer`](crate::buffer::PgsBuffer).
#[derive(ThisError, Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    #[error("tried to read {requested} bytes with only {available} available")]
    TruncatedInput { requested: usize, available: usize },
    #[error("zero-length access requested")]
    ZeroLengthAccess,
    #[error("buffer is read-only")]
    ReadOnlyViolation,
    #[error("position {position} is outside of buffer with length {length}")]
    InvalidPosition { position: usize, length: usize },
    #[error("field width of {0} bytes is not supported")]
    InvalidFieldWidth(usize),
    #[error("value {value} does not fit within {width} bytes")]
    FieldOverflow { value: u64, width: usize },
}

/// Errors raised when the bitstream (or a structure about to be written) is malformed.
#[derive(ThisError, Clone, Debug, PartialEq, Eq)]
pub enum StructuralError {
    #[error("segment at {offset:#x} has unrecognized magic number {magic:#06x}")]
    UnrecognizedMagicNumber { offset: usize, magic: u16 },
    #[error("segment at {offset:#x} has unrecognized kind {kind:#04x}")]
    UnrecognizedKind { offset: usize, kind: u8 },
    #[error("segment at {offset:#x} declared {declared} payload bytes but {consumed} were parsed")]
    SegmentLengthMismatch { offset: usize, declared: usize, consumed: usize },
    #[error("presentation composition segment has unrecognized composition state {0:#04x}")]
    UnrecognizedCompositionState(u8),
    #[error("presentation composition segment has unrecognized palette update flag {0:#04x}")]
    UnrecognizedPaletteUpdateFlag(u8),
    #[error("composition object has unrecognized cropped flag {0:#04x}")]
    UnrecognizedCropFlag(u8),
    #[error("object definition segment has unrecognized sequence flag {0:#04x}")]
    UnrecognizedSequenceFlag(u8),
    #[error("palette definition segment has invalid payload length {0}")]
    InvalidPaletteLength(usize),
    #[error("end segment has non-empty payload of {0} bytes")]
    EndSegmentNotEmpty(usize),
    #[error("segment payload of {0} bytes exceeds the maximum segment size")]
    SegmentTooLarge(usize),
    #[error("object {id} has {size} bytes of data, which exceeds the maximum object size")]
    ObjectDataTooLarge { id: u16, size: usize },
    #[error("object {id} has a size of zero pixels ({width}x{height})")]
    EmptyObject { id: u16, width: u16, height: u16 },
    #[error("display set #{index} has {count} {kind} segments instead of exactly one")]
    DisplaySetMultiplicity { index: usize, kind: &'static str, count: usize },
    #[error("display set #{index} defines palette {id} more than once")]
    DuplicatePaletteId { index: usize, id: u8 },
    #[error("display set #{index} defines object {id} more than once")]
    DuplicateObjectId { index: usize, id: u16 },
    #[error("stream does not end with an end segment")]
    TruncatedStream,
    #[error("composition references unknown object {0}")]
    UnknownObjectReference(u16),
    #[error("composition references unknown palette {0}")]
    UnknownPaletteReference(u8),
    #[error("run-length data is malformed at offset {0}")]
    MalformedRle(usize),
    #[error("bitmap is {actual_width}x{actual_height} but {width}x{height} was declared")]
    BitmapDimensionMismatch {
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
    #[error("object {0} has no replacement image")]
    MissingImage(u16),
}

/// Errors raised while reassembling objects split across several segments.
#[derive(ThisError, Clone, Debug, PartialEq, Eq)]
pub enum FragmentationError {
    #[error("fragment for object {id} does not continue an object in progress")]
    InvalidFragmentSequence { id: u16 },
    #[error("fragment for object {id} carries {actual} bytes where {expected} were expected")]
    FragmentLengthMismatch { id: u16, expected: usize, actual: usize },
    #[error("object {id} ended with {remaining} bytes still outstanding")]
    IncompleteObject { id: u16, remaining: usize },
    #[error("fragment for object {id} disagrees with its first fragment's header")]
    InconsistentFragment { id: u16 },
}

/// Errors raised when a protocol-mandated ceiling is exceeded.
#[derive(ThisError, Clone, Debug, PartialEq, Eq)]
pub enum LimitError {
    #[error("epoch has more than {limit} palettes")]
    TooManyPalettes { limit: usize },
    #[error("epoch has more than {limit} objects")]
    TooManyObjects { limit: usize },
    #[error("composition has {count} objects but at most {limit} are allowed")]
    TooManyCompositionObjects { count: usize, limit: usize },
    #[error("window definition segment has {0} windows")]
    TooManyWindows(usize),
    #[error("replacement images use more than {limit} colors")]
    TooManyColors { limit: usize },
}
