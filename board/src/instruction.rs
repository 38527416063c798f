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

//! Functions for off-chain clients building instructions which call the board
//! program.

use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

use crate::format::check_record;

type Result<T = (), E = ProgramError> = core::result::Result<T, E>;

/// Generates instruction appending `record` to the `board` account.
///
/// `expected_end` is the end of the record stream as observed by the client,
/// see [`crate::Board::stream_end`].  The program rejects the instruction if
/// the board changed in the meantime.
///
/// `record` is checked up front so that a malformed record never makes it
/// into a transaction.  Returns `InvalidInstructionData` if it isn’t
/// a single well-formed record and `ArithmeticOverflow` if `expected_end`
/// doesn’t fit in 32 bits.
pub fn append(
    program_id: Pubkey,
    board: Pubkey,
    expected_end: usize,
    record: &[u8],
) -> Result<Instruction> {
    check_record(record)?;
    let expected_end = u32::try_from(expected_end)
        .map_err(|_| ProgramError::ArithmeticOverflow)?;
    let data = [
        /* expected_end: */ &expected_end.to_le_bytes()[..],
        /* record: */ record,
    ]
    .concat();
    Ok(Instruction {
        program_id,
        accounts: vec![AccountMeta::new(board, false)],
        data,
    })
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_append() {
        let program_id = Pubkey::new_unique();
        let board = Pubkey::new_unique();
        let ix = append(program_id, board, 0x0102, b"Phi\0").unwrap();
        assert_eq!(program_id, ix.program_id);
        assert_eq!(vec![AccountMeta::new(board, false)], ix.accounts);
        assert_eq!(b"\x02\x01\x00\x00Phi\0", &ix.data[..]);
    }

    #[test]
    fn test_append_bad_input() {
        let program_id = Pubkey::new_unique();
        let board = Pubkey::new_unique();
        assert_eq!(
            Err(ProgramError::InvalidInstructionData),
            append(program_id, board, 2, b"Phi")
        );
        assert_eq!(
            Err(ProgramError::InvalidInstructionData),
            append(program_id, board, 2, b"?hi\0")
        );
        if let Ok(end) = usize::try_from(1u64 << 32) {
            assert_eq!(
                Err(ProgramError::ArithmeticOverflow),
                append(program_id, board, end, b"Phi\0")
            );
        }
    }
}
