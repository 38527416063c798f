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

//! Access to board accounts stored on a ledger.
//!
//! The codec itself never performs I/O.  [`Ledger`] is the narrow interface
//! through which boards are read and records appended.  [`MemoryLedger`]
//! keeps boards in memory and applies the same append rule as the on-chain
//! program; a client talking to a cluster implements the trait on top of
//! its RPC client.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use solana_program::pubkey::Pubkey;

use crate::error::Error;
use crate::format::Format;


/// Store of board accounts.
pub trait Ledger {
    type Error: From<Error>;

    /// Format of boards kept by this ledger.
    fn format(&self) -> Format { Format::DEFAULT }

    /// Returns a snapshot of the account’s data.
    ///
    /// Fails with `AccountNotFound` (or equivalent) if there’s no such
    /// account.
    fn read_buffer(&self, account: &Pubkey) -> Result<Vec<u8>, Self::Error>;

    /// Appends a record to the account’s board provided its record stream
    /// still ends at `expected_end`.  See [`Format::append`].
    ///
    /// Returns the new end of the stream.
    fn append(
        &self,
        account: &Pubkey,
        expected_end: usize,
        record: &[u8],
    ) -> Result<usize, Self::Error>;
}

/// Reads the board and appends record at its current end.
///
/// Read and append are separate operations so another writer may append in
/// between.  In that case the append fails with `StaleBuffer` rather than
/// overwriting the other record; retrying is up to the caller.
pub fn append_record<L: Ledger + ?Sized>(
    ledger: &L,
    account: &Pubkey,
    record: &[u8],
) -> Result<usize, L::Error> {
    let buffer = ledger.read_buffer(account)?;
    let end = ledger.format().decode(&buffer)?.stream_end();
    ledger.append(account, end, record)
}


/// Ledger keeping boards in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    format: Format,
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
}

impl MemoryLedger {
    pub fn new(format: Format) -> Self {
        Self { format, accounts: Default::default() }
    }

    /// Creates a zero-filled board; replaces existing one if any.
    pub fn create(&self, account: Pubkey) {
        tracing::debug!(%account, capacity = self.format.capacity(), "creating board");
        self.accounts().insert(account, vec![0; self.format.capacity()]);
    }

    /// Stores raw account data, bypassing any checks.
    pub fn insert(&self, account: Pubkey, data: Vec<u8>) {
        self.accounts().insert(account, data);
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<Pubkey, Vec<u8>>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Ledger for MemoryLedger {
    type Error = Error;

    fn format(&self) -> Format { self.format }

    fn read_buffer(&self, account: &Pubkey) -> Result<Vec<u8>, Error> {
        self.accounts()
            .get(account)
            .cloned()
            .ok_or(Error::AccountNotFound(*account))
    }

    fn append(
        &self,
        account: &Pubkey,
        expected_end: usize,
        record: &[u8],
    ) -> Result<usize, Error> {
        let mut accounts = self.accounts();
        let buffer = accounts
            .get_mut(account)
            .ok_or(Error::AccountNotFound(*account))?;
        match self.format.append(buffer, expected_end, record) {
            Ok(end) => {
                tracing::debug!(%account, end, "appended record");
                Ok(end)
            }
            Err(err) => {
                tracing::debug!(%account, %err, "append rejected");
                Err(err)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::encode::encode_post;

    #[test]
    fn test_read_buffer() {
        let ledger = MemoryLedger::default();
        let account = Pubkey::new_unique();
        assert_eq!(
            Err(Error::AccountNotFound(account)),
            ledger.read_buffer(&account)
        );
        ledger.create(account);
        assert_eq!(Ok(vec![0; crate::CAPACITY]), ledger.read_buffer(&account));
    }

    #[test]
    fn test_append_record() {
        let ledger = MemoryLedger::new(Format::new(32).unwrap());
        let account = Pubkey::new_unique();
        assert_eq!(
            Err(Error::AccountNotFound(account)),
            append_record(&ledger, &account, b"Pa\0")
        );

        ledger.create(account);
        assert_eq!(Ok(5), append_record(&ledger, &account, b"Pa\0"));
        assert_eq!(Ok(9), append_record(&ledger, &account, b"Lbc\0"));

        let buffer = ledger.read_buffer(&account).unwrap();
        let board = ledger.format().decode(&buffer).unwrap();
        assert_eq!(2, board.advisory_count());
        assert_eq!(2, board.records().count());
    }

    #[test]
    fn test_malformed_account() {
        let ledger = MemoryLedger::default();
        let account = Pubkey::new_unique();
        ledger.insert(account, vec![0; 10]);
        assert_eq!(
            Err(Error::MalformedBuffer { got: 10, capacity: crate::CAPACITY }),
            append_record(&ledger, &account, b"Pa\0")
        );
    }

    /// Two writers read the board, then both try to append.  Exactly one
    /// succeeds; the other gets `StaleBuffer` and nothing is lost.
    #[test]
    fn test_lost_update_detected() {
        let ledger = MemoryLedger::default();
        let account = Pubkey::new_unique();
        ledger.create(account);

        let barrier = std::sync::Barrier::new(2);
        let results = std::thread::scope(|scope| {
            let writers = ["first", "second"].map(|body| {
                let (ledger, barrier) = (&ledger, &barrier);
                scope.spawn(move || {
                    let buffer = ledger.read_buffer(&account).unwrap();
                    let end = decode_end(&buffer);
                    barrier.wait();
                    let record = encode_post(body).unwrap();
                    ledger.append(&account, end, &record)
                })
            });
            writers.map(|writer| writer.join().unwrap())
        });

        let ok = results.iter().filter(|res| res.is_ok()).count();
        assert_eq!(1, ok);
        let err = results.iter().find_map(|res| res.clone().err()).unwrap();
        assert!(matches!(err, Error::StaleBuffer { expected: 2, .. }));

        let buffer = ledger.read_buffer(&account).unwrap();
        assert_eq!(1, crate::decode(&buffer).unwrap().records().count());
    }

    fn decode_end(buffer: &[u8]) -> usize {
        crate::decode(buffer).unwrap().stream_end()
    }
}
