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

use core::fmt;
use core::str::FromStr;

use solana_program::pubkey::Pubkey;

use crate::decode::Record;
use crate::error::{Error, UnknownTag};
use crate::format::Tag;
use crate::ledger::Ledger;


/// Identifies a record by the board account it lives in and its 0-based
/// position in that board’s record stream.
///
/// Textual form is `<account>:<index>` with the account in base-58.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    pub source: Pubkey,
    pub record_index: u32,
}

impl Reference {
    /// Fetches the source board from the ledger and returns the referenced
    /// record.
    ///
    /// Fails with `RecordOutOfRange` if the board has fewer records.  Errors
    /// reading or decoding the board are propagated.
    pub fn resolve<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
    ) -> Result<OwnedRecord, L::Error> {
        let buffer = ledger.read_buffer(&self.source)?;
        let board = ledger.format().decode(&buffer)?;
        usize::try_from(self.record_index)
            .ok()
            .and_then(|index| board.get(index))
            .map(Record::into_owned)
            .ok_or_else(|| {
                Error::RecordOutOfRange {
                    account: self.source,
                    index: self.record_index,
                    count: board.records().count(),
                }
                .into()
            })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        write!(fmtr, "{}:{}", self.source, self.record_index)
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(reference: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedReference(reference.into());
        let (source, index) = reference.rsplit_once(':').ok_or_else(malformed)?;
        let source = Pubkey::from_str(source).map_err(|_| malformed())?;
        let record_index = index
            .parse::<u32>()
            .ok()
            .filter(|_| index.bytes().all(|byte| byte.is_ascii_digit()))
            .ok_or_else(malformed)?;
        Ok(Self { source, record_index })
    }
}


/// A record copied out of a board buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnedRecord {
    pub tag: u8,
    pub body: Vec<u8>,
}

impl OwnedRecord {
    pub fn kind(&self) -> Result<Tag, UnknownTag> { Tag::try_from(self.tag) }

    pub fn as_record(&self) -> Record<'_> {
        Record { tag: self.tag, body: &self.body }
    }
}
