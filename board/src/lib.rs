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

//! Smart contract and library functions for a message board whose posts live
//! in the data of a Solana account.
//!
//! The account data is a fixed-size buffer.  The first two bytes hold
//! a little-endian post count which is advisory only: nothing in this crate
//! trusts it when reading records.  The rest of the buffer is a stream of
//! records, each being a single tag byte followed by a body and a NUL
//! terminator.  Two NUL bytes in a row mark the end of the stream.
//!
//! ```text
//! +-------+-----+------+----+-----+------+----+----+-----
//! | count | tag | body | \0 | tag | body | \0 | \0 | ...
//! +-------+-----+------+----+-----+------+----+----+-----
//! ```
//!
//! [`Format::decode`] interprets a buffer snapshot as a [`Board`] from which
//! records can be iterated or rendered for display.  The [`encode`] module
//! constructs record payloads for new posts and likes and [`Format::append`]
//! is the write rule used by the on-chain program (see [`program`]) and by
//! [`ledger::MemoryLedger`].
//!
//! # Features
#![doc = document_features::document_features!()]

mod decode;
pub mod encode;
mod error;
mod format;
pub mod ledger;
pub mod program;
mod reference;

#[cfg(feature = "client")]
pub mod instruction;

pub use decode::{decode, Board, Record, Records, Rendered};
pub use encode::{encode_like, encode_like_reference, encode_post, encode_record};
pub use error::{Error, UnknownTag, STALE_BUFFER_CODE};
pub use format::{Format, Tag, CAPACITY, HEADER_LEN, TERMINATOR};
pub use reference::{OwnedRecord, Reference};
