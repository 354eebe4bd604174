/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Reassembles objects that were split across several ODS fragments.
//!
//! A FIRST fragment declares the object's total data length and dimensions and establishes
//! the fragment size every MIDDLE fragment must repeat. The LAST fragment may be shorter, but
//! must account for exactly the bytes still outstanding. Only once that happens is the object
//! promoted to an [`ObjectDefinitionSegment`]; until then it lives here as a
//! [`PartialObject`].


use super::{
    ObjectDefinitionSegment,
    Sequence,
    super::error::{FragmentationError, PgsResult, StructuralError},
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The header fields shared by every fragment of an object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FragmentHeader {
    pub pts: u32,
    pub dts: u32,
    pub id: u16,
    pub version: u8,
    pub sequence: Sequence,
}

/// The reassembly state of a single object ID.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectState {
    AwaitingFirst,
    Accumulating,
    Complete,
}

/// An object whose LAST fragment has not arrived yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialObject {
    pub pts: u32,
    pub dts: u32,
    pub id: u16,
    pub version: u8,
    pub width: u16,
    pub height: u16,
    /// RLE data received so far.
    pub data: Vec<u8>,
    /// RLE bytes still outstanding.
    pub remaining: usize,
    /// The data size every MIDDLE fragment must carry.
    pub fragment_size: usize,
    pub fragment_count: usize,
}

/// Tracks every object currently being reassembled within a display set.
#[derive(Clone, Debug, Default)]
pub struct ObjectAssembler {
    pending: BTreeMap<u16, PartialObject>,
    completed: BTreeSet<u16>,
}

impl ObjectAssembler {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: u16) -> ObjectState {
        if self.pending.contains_key(&id) {
            ObjectState::Accumulating
        } else if self.completed.contains(&id) {
            ObjectState::Complete
        } else {
            ObjectState::AwaitingFirst
        }
    }

    /// Whether any object is still waiting for more fragments.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Handles a FIRST (or FIRST_AND_LAST) fragment.
    ///
    /// `data_length` is the 24-bit length field, which counts the width and height as well as
    /// the RLE data. `fragment_size` is the whole object data carried by this fragment,
    /// including the length, width, and height fields.
    ///
    /// Returns the finished object if this fragment was also the last one.
    pub fn begin(
        &mut self,
        header: FragmentHeader,
        data_length: usize,
        width: u16,
        height: u16,
        chunk: &[u8],
        fragment_size: usize,
    ) -> PgsResult<Option<ObjectDefinitionSegment>> {

        let id = header.id;

        if self.pending.contains_key(&id) {
            return Err(FragmentationError::InvalidFragmentSequence { id }.into())
        }
        if width == 0 || height == 0 {
            return Err(StructuralError::EmptyObject { id, width, height }.into())
        }

        let rle_length = data_length.checked_sub(4)
            .ok_or(FragmentationError::FragmentLengthMismatch {
                id,
                expected: data_length,
                actual: chunk.len() + 4,
            })?;
        let remaining = rle_length.checked_sub(chunk.len())
            .ok_or(FragmentationError::FragmentLengthMismatch {
                id,
                expected: rle_length,
                actual: chunk.len(),
            })?;
        let partial = PartialObject {
            pts: header.pts,
            dts: header.dts,
            id,
            version: header.version,
            width,
            height,
            data: chunk.to_vec(),
            remaining,
            fragment_size,
            fragment_count: 1,
        };

        self.completed.remove(&id);

        if header.sequence.is_last() {
            self.complete(partial).map(Some)
        } else {
            self.pending.insert(id, partial);
            Ok(None)
        }
    }

    /// Handles a MIDDLE or LAST fragment.
    ///
    /// Returns the finished object if this fragment was the last one.
    pub fn extend(
        &mut self,
        header: FragmentHeader,
        chunk: &[u8],
    ) -> PgsResult<Option<ObjectDefinitionSegment>> {

        let id = header.id;
        let partial = self.pending.get_mut(&id)
            .ok_or(FragmentationError::InvalidFragmentSequence { id })?;

        if partial.pts != header.pts
            || partial.dts != header.dts
            || partial.version != header.version {
            return Err(FragmentationError::InconsistentFragment { id }.into())
        }
        if chunk.len() > partial.remaining {
            return Err(
                FragmentationError::FragmentLengthMismatch {
                    id,
                    expected: partial.remaining,
                    actual: chunk.len(),
                }.into()
            )
        }

        if header.sequence.is_last() {
            if chunk.len() > partial.fragment_size {
                return Err(
                    FragmentationError::FragmentLengthMismatch {
                        id,
                        expected: partial.fragment_size,
                        actual: chunk.len(),
                    }.into()
                )
            }
        } else if chunk.len() != partial.fragment_size {
            return Err(
                FragmentationError::FragmentLengthMismatch {
                    id,
                    expected: partial.fragment_size,
                    actual: chunk.len(),
                }.into()
            )
        }

        partial.data.extend_from_slice(chunk);
        partial.remaining -= chunk.len();
        partial.fragment_count += 1;

        if header.sequence.is_last() {
            match self.pending.remove(&id) {
                Some(partial) => self.complete(partial).map(Some),
                None => Err(FragmentationError::InvalidFragmentSequence { id }.into()),
            }
        } else {
            Ok(None)
        }
    }

    /// Closes out a display set, failing if any object is still missing fragments.
    pub fn finish_display_set(&mut self) -> PgsResult<()> {

        if let Some(partial) = self.pending.values().next() {
            return Err(
                FragmentationError::IncompleteObject {
                    id: partial.id,
                    remaining: partial.remaining,
                }.into()
            )
        }

        self.completed.clear();

        Ok(())
    }

    fn complete(&mut self, partial: PartialObject) -> PgsResult<ObjectDefinitionSegment> {

        if partial.remaining != 0 {
            return Err(
                FragmentationError::IncompleteObject {
                    id: partial.id,
                    remaining: partial.remaining,
                }.into()
            )
        }

        if partial.fragment_count > 1 {
            debug!(
                "object {} assembled from {} fragments ({} bytes)",
                partial.id,
                partial.fragment_count,
                partial.data.len(),
            );
        }

        self.completed.insert(partial.id);

        Ok(
            ObjectDefinitionSegment {
                pts: partial.pts,
                dts: partial.dts,
                id: partial.id,
                version: partial.version,
                width: partial.width,
                height: partial.height,
                data: partial.data,
                image: None,
                width_delta: 0,
                height_delta: 0,
            }
        )
    }
}
