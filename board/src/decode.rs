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

use std::borrow::Cow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::{Error, UnknownTag};
use crate::format::{Format, Tag, HEADER_LEN, TERMINATOR};
use crate::reference::{OwnedRecord, Reference};


/// Decodes a buffer of the default [`crate::CAPACITY`].
///
/// Shorthand for `Format::DEFAULT.decode(buffer)`.
pub fn decode(buffer: &[u8]) -> Result<Board<'_>, Error> {
    Format::DEFAULT.decode(buffer)
}

impl Format {
    /// Interprets a buffer snapshot as a board.
    ///
    /// Fails with `MalformedBuffer` if the buffer length is not exactly the
    /// capacity.  Otherwise never fails; records are decoded lazily by
    /// [`Board::records`] which never reads past the buffer and never panics
    /// regardless of its content.
    pub fn decode<'a>(&self, buffer: &'a [u8]) -> Result<Board<'a>, Error> {
        self.check_len(buffer)?;
        Ok(Board { data: buffer })
    }
}


/// A decoded view of a board buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board<'a> {
    data: &'a [u8],
}

impl<'a> Board<'a> {
    /// Returns the count stored in the header.
    ///
    /// The count is written by the program on each append but nothing
    /// guarantees it matches the number of records in the stream.  It is
    /// meant for display only.
    pub fn advisory_count(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    pub fn capacity(&self) -> usize { self.data.len() }

    /// Returns iterator over records in stream order.
    pub fn records(&self) -> Records<'a> {
        Records { data: self.data, pos: HEADER_LEN, end: HEADER_LEN }
    }

    /// Returns record at given 0-based position.
    pub fn get(&self, index: usize) -> Option<Record<'a>> {
        self.records().nth(index)
    }

    /// Returns offset just past the last complete record, i.e. where the
    /// next record is to be appended.  For an empty stream that is
    /// [`HEADER_LEN`].
    pub fn stream_end(&self) -> usize {
        let mut records = self.records();
        records.by_ref().count();
        records.end()
    }

    /// Returns iterator over records rendered for display with 1-based
    /// indices and given author.
    pub fn rendered<A: Copy + 'a>(
        &self,
        author: A,
    ) -> impl Iterator<Item = Rendered<'a, A>> + 'a {
        self.records().enumerate().map(move |(n, record)| Rendered {
            index: n + 1,
            record,
            author,
        })
    }
}


/// Iterator over records of a board.
///
/// Scanning starts right after the header.  At each record boundary the next
/// byte is the tag and the following bytes up to a NUL terminator are the
/// body.  The iterator stops at:
/// - a NUL byte preceded by another NUL byte (the end-of-stream sentinel),
///   which takes precedence over every other interpretation of the byte; for
///   the first byte of the stream the preceding byte is the last byte of the
///   header,
/// - end of the buffer; a record without terminator at the end of the buffer
///   is silently dropped.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Records<'a> {
    /// Returns offset just past the last record returned so far.
    pub fn end(&self) -> usize { self.end }

    fn finish(&mut self) -> Option<Record<'a>> {
        self.pos = self.data.len();
        None
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Record<'a>> {
        let data = self.data;
        let tag = *data.get(self.pos)?;
        // pos ≥ HEADER_LEN so there’s always a preceding byte.
        if tag == TERMINATOR && data[self.pos - 1] == TERMINATOR {
            return self.finish();
        }

        let start = self.pos + 1;
        let len = match data[start..].iter().position(|b| *b == TERMINATOR) {
            // A NUL tag followed by NUL is a sentinel, not an empty record.
            Some(0) if tag == TERMINATOR => return self.finish(),
            Some(len) => len,
            None => return self.finish(),
        };

        let term = start + len;
        self.pos = term + 1;
        self.end = self.pos;
        Some(Record { tag, body: &data[start..term] })
    }
}

impl FusedIterator for Records<'_> {}


/// A single record borrowed from a board buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Record<'a> {
    /// Raw tag byte.
    pub tag: u8,
    /// Body; never contains a NUL byte.
    pub body: &'a [u8],
}

impl<'a> Record<'a> {
    /// Maps the raw tag onto [`Tag`].
    pub fn kind(&self) -> Result<Tag, UnknownTag> { Tag::try_from(self.tag) }

    /// Returns body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'a, str> { String::from_utf8_lossy(self.body) }

    /// Parses body of a like record as a structured [`Reference`].
    ///
    /// Returns `None` for other record kinds and for likes which quote the
    /// liked body rather than referencing it.
    pub fn reference(&self) -> Option<Reference> {
        if self.tag != Tag::Like.byte() {
            return None;
        }
        core::str::from_utf8(self.body).ok()?.parse().ok()
    }

    pub fn into_owned(self) -> OwnedRecord {
        OwnedRecord { tag: self.tag, body: self.body.to_vec() }
    }
}


/// Record formatted for display.
///
/// The [`fmt::Display`] form is
/// `<index> - Type: <tag> - <body> - Posted By: <author>` which is what
/// [`crate::encode::parse_rendered`] accepts.
#[derive(Clone, Copy, Debug)]
pub struct Rendered<'a, A> {
    /// 1-based position of the record on the board.
    pub index: usize,
    pub record: Record<'a>,
    pub author: A,
}

impl<A: fmt::Display> fmt::Display for Rendered<'_, A> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmtr,
            "{} - Type: {} - {} - Posted By: {}",
            self.index,
            char::from(self.record.tag),
            self.record.text(),
            self.author
        )
    }
}
