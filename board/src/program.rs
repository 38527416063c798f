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

//! The smart contract appending records to board accounts.
//!
//! The instruction takes a single writable account owned by the program: the
//! board.  Its capacity is the size of the account data.  Instruction data is
//! the stream end observed by the client as an unsigned 32-bit little-endian
//! integer followed by the record to append:
//!
//! ```text
//! +--------------+-----+------+----+
//! | expected end | tag | body | \0 |
//! +--------------+-----+------+----+
//! ```
//!
//! See [`crate::Format::append`] for the conditions under which the record is
//! appended.

use solana_program::account_info::AccountInfo;
use solana_program::entrypoint::ProgramResult;
use solana_program::msg;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

use crate::format::Format;

/// Length of the expected stream end prefix of the instruction data.
pub const EXPECTED_END_LEN: usize = 4;

#[cfg(not(feature = "client"))]
solana_program::entrypoint!(process_instruction);

/// Processes an append instruction.
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let Some(board) = accounts.first() else {
        msg!("Board account not included in the instruction");
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if board.owner != program_id {
        msg!("Board account does not have the correct program id");
        return Err(ProgramError::IncorrectProgramId);
    }
    if !board.is_writable {
        msg!("Board account is not writable");
        return Err(ProgramError::InvalidAccountData);
    }

    let (expected_end, record) = parse_data(data)?;
    msg!("Received {}-byte record at offset {}", record.len(), expected_end);

    let mut buffer = board.try_borrow_mut_data()?;
    let format =
        Format::new(buffer.len()).ok_or(ProgramError::AccountDataTooSmall)?;
    let end = format
        .append(&mut buffer[..], expected_end, record)
        .map_err(|err| {
            msg!("{}", err);
            ProgramError::from(err)
        })?;
    msg!("Bytes used: {} of {}", end, format.capacity());
    Ok(())
}

/// Splits instruction data into expected stream end and the record.
fn parse_data(data: &[u8]) -> Result<(usize, &[u8]), ProgramError> {
    let (end, record) = data
        .split_first_chunk::<EXPECTED_END_LEN>()
        .ok_or(ProgramError::InvalidInstructionData)?;
    let end = usize::try_from(u32::from_le_bytes(*end))
        .map_err(|_| ProgramError::ArithmeticOverflow)?;
    Ok((end, record))
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::STALE_BUFFER_CODE;

    fn account_info<'a>(
        key: &'a Pubkey,
        owner: &'a Pubkey,
        is_writable: bool,
        lamports: &'a mut u64,
        data: &'a mut [u8],
    ) -> AccountInfo<'a> {
        AccountInfo::new(key, false, is_writable, lamports, data, owner, false, 0)
    }

    fn ix_data(expected_end: u32, record: &[u8]) -> Vec<u8> {
        [&expected_end.to_le_bytes()[..], record].concat()
    }

    /// Runs the instruction against a board with given data; returns result
    /// and the data afterwards.
    fn run(board: &[u8], data: &[u8]) -> (ProgramResult, Vec<u8>) {
        let program_id = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let mut lamports = 1u64;
        let mut board = board.to_vec();
        let accounts =
            [account_info(&key, &program_id, true, &mut lamports, &mut board)];
        let res = process_instruction(&program_id, &accounts, data);
        drop(accounts);
        (res, board)
    }

    #[test]
    fn test_append() {
        let (res, board) = run(&[0; 16], &ix_data(2, b"Ptest\0"));
        assert_eq!(Ok(()), res);
        assert_eq!(b"\x01\x00Ptest\0\0\0\0\0\0\0\0\0", &board[..]);

        let (res, board) = run(&board, &ix_data(8, b"Lok\0"));
        assert_eq!(Ok(()), res);
        assert_eq!(b"\x02\x00Ptest\0Lok\0\0\0\0\0", &board[..]);
    }

    #[test]
    fn test_stale() {
        let (_, board) = run(&[0; 16], &ix_data(2, b"Ptest\0"));
        let (res, after) = run(&board, &ix_data(2, b"Pother\0"));
        assert_eq!(Err(ProgramError::Custom(STALE_BUFFER_CODE)), res);
        assert_eq!(board, after);
    }

    #[test]
    fn test_full() {
        let (res, board) = run(&[0; 8], &ix_data(2, b"Ptoolong\0"));
        assert_eq!(Err(ProgramError::AccountDataTooSmall), res);
        assert_eq!(vec![0u8; 8], board);
    }

    #[test]
    fn test_bad_data() {
        for data in [
            &b""[..],
            &b"\x02\x00\x00"[..],
            &b"\x02\x00\x00\x00"[..],
            &b"\x02\x00\x00\x00Ptest"[..],
            &b"\x02\x00\x00\x00Pte\0st\0"[..],
            &b"\x02\x00\x00\x00?test\0"[..],
        ] {
            let (res, board) = run(&[0; 16], data);
            assert_eq!(Err(ProgramError::InvalidInstructionData), res);
            assert_eq!(vec![0u8; 16], board);
        }
    }

    #[test]
    fn test_bad_accounts() {
        let program_id = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let data = ix_data(2, b"Ptest\0");

        assert_eq!(
            Err(ProgramError::NotEnoughAccountKeys),
            process_instruction(&program_id, &[], &data)
        );

        let mut lamports = 1u64;
        let mut board = [0u8; 16];
        let accounts =
            [account_info(&key, &other, true, &mut lamports, &mut board)];
        assert_eq!(
            Err(ProgramError::IncorrectProgramId),
            process_instruction(&program_id, &accounts, &data)
        );

        let mut lamports = 1u64;
        let mut board = [0u8; 16];
        let accounts =
            [account_info(&key, &program_id, false, &mut lamports, &mut board)];
        assert_eq!(
            Err(ProgramError::InvalidAccountData),
            process_instruction(&program_id, &accounts, &data)
        );
    }

    #[test]
    fn test_tiny_account() {
        let (res, _) = run(&[0; 1], &ix_data(2, b"Ptest\0"));
        assert_eq!(Err(ProgramError::AccountDataTooSmall), res);
    }
}
