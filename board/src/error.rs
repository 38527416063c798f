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

use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

/// Custom program error code reported when an append was made against
/// a stale view of the board.
pub const STALE_BUFFER_CODE: u32 = 0x0b0a_0001;

/// Record tag byte which doesn’t correspond to any [`crate::Tag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display("unknown record tag {_0:#04x}")]
pub struct UnknownTag(pub u8);

/// Errors reported by the codec and the ledger collaborators.
///
/// `MalformedBuffer`, `InvalidBody`, `MalformedReference` and `InvalidRecord`
/// indicate bad local input and are reported before any I/O happens.
/// `AccountNotFound` comes from the ledger read path unchanged.  `StaleBuffer`
/// and `BufferFull` come from the append path.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Error {
    /// Buffer length doesn’t match the format’s capacity.
    #[display("malformed buffer: got {got} bytes but capacity is {capacity}")]
    MalformedBuffer { got: usize, capacity: usize },

    /// Body contains a NUL byte at given offset.
    #[display("record body contains NUL byte at offset {_0}")]
    InvalidBody(usize),

    /// Reference doesn’t have the expected shape.
    #[display("malformed record reference: {_0:?}")]
    MalformedReference(String),

    /// The ledger has no such account.
    #[display("account {_0} not found")]
    AccountNotFound(Pubkey),

    #[display("{_0}")]
    UnknownTag(UnknownTag),

    /// Append payload is not exactly one terminated record.
    #[display("payload is not a single well-formed record")]
    InvalidRecord,

    /// Referenced record doesn’t exist.
    #[display("account {account} has {count} records; no record {index}")]
    RecordOutOfRange { account: Pubkey, index: u32, count: usize },

    /// Stream end moved since the caller last read the buffer.
    #[display("board changed: expected stream end at {expected} but it is at {actual}")]
    StaleBuffer { expected: usize, actual: usize },

    /// Record doesn’t fit in the remaining space.
    #[display("account too small: {needed} bytes needed at offset {end} of {capacity}")]
    BufferFull { end: usize, needed: usize, capacity: usize },
}

impl std::error::Error for Error {}

impl From<UnknownTag> for Error {
    fn from(tag: UnknownTag) -> Self { Self::UnknownTag(tag) }
}

impl From<Error> for ProgramError {
    fn from(err: Error) -> Self {
        match err {
            Error::MalformedBuffer { .. } => Self::InvalidAccountData,
            Error::AccountNotFound(_) => Self::NotEnoughAccountKeys,
            Error::StaleBuffer { .. } => Self::Custom(STALE_BUFFER_CODE),
            Error::BufferFull { .. } => Self::AccountDataTooSmall,
            Error::InvalidBody(_) |
            Error::MalformedReference(_) |
            Error::UnknownTag(_) |
            Error::InvalidRecord |
            Error::RecordOutOfRange { .. } => Self::InvalidInstructionData,
        }
    }
}
