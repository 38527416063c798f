// solana-board — helper program and library for message board records stored
//                in a Solana account
// © 2024 by Composable Foundation
// © 2025 by Michał Nazarewicz <mina86@mina86.com>
//
// This program is free software; you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation; either version 2 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program; if not, see <https://www.gnu.org/licenses/>.

use crate::error::{Error, UnknownTag};

type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Default size of a board account’s data.
pub const CAPACITY: usize = 1024;

/// Length of the advisory record count at the start of the buffer.
pub const HEADER_LEN: usize = 2;

/// Byte terminating each record.  Two in a row end the record stream.
pub const TERMINATOR: u8 = 0;

/// Kind of a record as identified by its leading tag byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Tag {
    #[display("P")]
    Post,
    #[display("R")]
    Reply,
    #[display("L")]
    Like,
    #[display("X")]
    Report,
}

impl Tag {
    /// Returns the byte this tag is stored as.
    pub const fn byte(self) -> u8 {
        match self {
            Self::Post => b'P',
            Self::Reply => b'R',
            Self::Like => b'L',
            Self::Report => b'X',
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = UnknownTag;

    fn try_from(byte: u8) -> Result<Self, UnknownTag> {
        match byte {
            b'P' => Ok(Self::Post),
            b'R' => Ok(Self::Reply),
            b'L' => Ok(Self::Like),
            b'X' => Ok(Self::Report),
            _ => Err(UnknownTag(byte)),
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 { tag.byte() }
}


/// Layout parameters of a board buffer.
///
/// The only parameter is the capacity, i.e. the exact length every buffer
/// must have.  [`Format::DEFAULT`] uses [`CAPACITY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    capacity: usize,
}

impl Format {
    pub const DEFAULT: Format = match Format::new(CAPACITY) {
        Some(format) => format,
        None => unreachable!(),
    };

    /// Creates format for buffers of given capacity.  Returns `None` if the
    /// capacity cannot hold the header.
    pub const fn new(capacity: usize) -> Option<Self> {
        if capacity < HEADER_LEN {
            None
        } else {
            Some(Self { capacity })
        }
    }

    pub const fn capacity(&self) -> usize { self.capacity }

    /// Verifies that buffer is exactly as long as the capacity.
    pub(crate) fn check_len(&self, buffer: &[u8]) -> Result {
        if buffer.len() == self.capacity {
            Ok(())
        } else {
            Err(Error::MalformedBuffer {
                got: buffer.len(),
                capacity: self.capacity,
            })
        }
    }

    /// Appends a record at the end of the record stream.
    ///
    /// `record` must be a single record as produced by [`crate::encode`]
    /// functions: a known tag, body without NUL bytes and a terminating NUL.
    ///
    /// The append succeeds only if the stream currently ends at
    /// `expected_end`, the value the writer observed through
    /// [`crate::Board::stream_end`] before building the record.  Otherwise
    /// `StaleBuffer` is returned and the buffer is left untouched.  The
    /// advisory count is not consulted to find the end of the stream.
    ///
    /// Any unterminated tail left by a previous write is overwritten and
    /// a terminator is placed after the new record (if there’s room) so the
    /// stream always ends in a sentinel.  The advisory count is incremented
    /// with wrapping.
    ///
    /// Returns offset of the new end of the stream.
    pub fn append(
        &self,
        buffer: &mut [u8],
        expected_end: usize,
        record: &[u8],
    ) -> Result<usize> {
        let end = self.decode(buffer)?.stream_end();
        check_record(record)?;
        if end != expected_end {
            return Err(Error::StaleBuffer {
                expected: expected_end,
                actual: end,
            });
        }
        let new_end = end
            .checked_add(record.len())
            .filter(|new_end| *new_end <= self.capacity)
            .ok_or(Error::BufferFull {
                end,
                needed: record.len(),
                capacity: self.capacity,
            })?;

        buffer[end..new_end].copy_from_slice(record);
        if let Some(byte) = buffer.get_mut(new_end) {
            *byte = TERMINATOR;
        }
        let count = u16::from_le_bytes([buffer[0], buffer[1]]).wrapping_add(1);
        buffer[..HEADER_LEN].copy_from_slice(&count.to_le_bytes());
        Ok(new_end)
    }
}

impl Default for Format {
    fn default() -> Self { Self::DEFAULT }
}


/// Checks that `record` is exactly one terminated record with a known tag.
pub(crate) fn check_record(record: &[u8]) -> Result<Tag> {
    let (&tag, rest) = record.split_first().ok_or(Error::InvalidRecord)?;
    let tag = Tag::try_from(tag)?;
    match rest.split_last() {
        Some((&TERMINATOR, body)) if !body.contains(&TERMINATOR) => Ok(tag),
        _ => Err(Error::InvalidRecord),
    }
}
