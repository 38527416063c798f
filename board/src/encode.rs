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

//! Construction of record payloads to be appended to a board.
//!
//! All functions are pure.  The payloads are meant to be passed to
//! [`crate::ledger::Ledger::append`] (or embedded in an append instruction)
//! together with the stream end observed when the board was last read.

use crate::error::Error;
use crate::format::{Tag, TERMINATOR};
use crate::reference::Reference;

type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Delimiter between fields of a rendered record.
const DELIMITER: &str = " - ";


/// Encodes a record with given tag and body.
///
/// Fails with `InvalidBody` if the body contains a NUL byte since the format
/// has no way of escaping it.
pub fn encode_record(tag: Tag, body: &[u8]) -> Result<Vec<u8>> {
    if let Some(offset) = body.iter().position(|byte| *byte == TERMINATOR) {
        return Err(Error::InvalidBody(offset));
    }
    Ok([&[tag.byte()][..], body, &[TERMINATOR][..]].concat())
}

/// Encodes a new post.
pub fn encode_post(body: &str) -> Result<Vec<u8>> {
    encode_record(Tag::Post, body.as_bytes())
}

/// Encodes a like of a record given in its rendered form.
///
/// The rendered form is parsed with [`parse_rendered`] and the resulting like
/// quotes the body of the liked record.  Nothing else about the liked record
/// survives, so two records with the same body are indistinguishable targets.
/// [`encode_like_reference`] doesn’t have that problem.
pub fn encode_like(rendered: &str) -> Result<Vec<u8>> {
    let fields = parse_rendered(rendered)?;
    encode_record(Tag::Like, fields.body.as_bytes())
}

/// Encodes a like which identifies the liked record by account and position.
pub fn encode_like_reference(reference: &Reference) -> Vec<u8> {
    let body = reference.to_string();
    [&[Tag::Like.byte()][..], body.as_bytes(), &[TERMINATOR][..]].concat()
}


/// Fields of a record in the form produced by [`crate::Rendered`].
///
/// The `Type: ` and `Posted By: ` labels are stripped from the tag and
/// author when present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedFields<'a> {
    pub index: &'a str,
    pub tag: &'a str,
    pub body: &'a str,
    pub author: &'a str,
}

/// Parses `<index> - Type: <tag> - <body> - Posted By: <author>`.
///
/// The string must split on ` - ` into exactly four fields; fails with
/// `MalformedReference` otherwise.  Consequently a body which itself
/// contains ` - ` can’t be recovered from the rendered form; such records
/// have to be liked through [`encode_like_reference`].
pub fn parse_rendered(rendered: &str) -> Result<RenderedFields<'_>> {
    let malformed = || Error::MalformedReference(rendered.into());
    let fields = rendered.split(DELIMITER).collect::<Vec<_>>();
    let &[index, tag, body, author] = &fields[..] else {
        return Err(malformed());
    };
    Ok(RenderedFields {
        index,
        tag: tag.strip_prefix("Type: ").unwrap_or(tag),
        body,
        author: author.strip_prefix("Posted By: ").unwrap_or(author),
    })
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use solana_program::pubkey::Pubkey;

    use super::*;
    use crate::format::{Format, CAPACITY};

    #[test]
    fn test_encode_post() {
        assert_eq!(Ok(b"Phello\0".to_vec()), encode_post("hello"));
        assert_eq!(Ok(b"P\0".to_vec()), encode_post(""));
        assert_eq!(
            Ok("Pzażółć\0".as_bytes().to_vec()),
            encode_post("zażółć")
        );
    }

    #[test]
    fn test_encode_post_nul() {
        for (body, offset) in [("\0", 0), ("a\0", 1), ("ab\0cd", 2)] {
            assert_eq!(Err(Error::InvalidBody(offset)), encode_post(body));
        }
    }

    #[test]
    fn test_encode_record() {
        assert_eq!(Ok(b"Rre\0".to_vec()), encode_record(Tag::Reply, b"re"));
        assert_eq!(Ok(b"X\xff\0".to_vec()), encode_record(Tag::Report, b"\xff"));
        assert_eq!(Err(Error::InvalidBody(0)), encode_record(Tag::Like, b"\0"));
    }

    #[test]
    fn test_post_round_trip() {
        let format = Format::DEFAULT;
        for body in ["hello", "", "a - b", "ünïcödé"] {
            let mut buf = vec![0u8; CAPACITY];
            let record = encode_post(body).unwrap();
            format.append(&mut buf, 2, &record).unwrap();
            let board = format.decode(&buf).unwrap();
            let records = board.records().collect::<Vec<_>>();
            assert_eq!(1, records.len());
            assert_eq!(Ok(Tag::Post), records[0].kind());
            assert_eq!(body.as_bytes(), records[0].body);
        }
    }

    #[test]
    fn test_encode_like() {
        assert_eq!(
            Ok(b"Lhello\0".to_vec()),
            encode_like("1 - Type: P - hello - Posted By: Abc123")
        );
        assert_eq!(
            Ok(b"L\0".to_vec()),
            encode_like("3 - Type: P -  - Posted By: Abc123")
        );
        assert_eq!(
            Ok(b"Lhello\0".to_vec()),
            encode_like("x - P - hello - Abc123")
        );
    }

    #[test]
    fn test_encode_like_malformed() {
        for rendered in [
            "",
            "hello",
            "1 - Type: P - Posted By: Abc123",
            "1 - Type: P - hello",
            "2 - Type: P - a - b - Posted By: Abc123",
            "1 - Type: P - hello - Posted By: Abc123 - extra",
        ] {
            assert_eq!(
                Err(Error::MalformedReference(rendered.into())),
                encode_like(rendered),
            );
        }
    }

    #[test]
    fn test_parse_rendered() {
        assert_eq!(
            Ok(RenderedFields {
                index: "12",
                tag: "L",
                body: "nice post",
                author: "Abc123",
            }),
            parse_rendered("12 - Type: L - nice post - Posted By: Abc123")
        );
    }

    #[test]
    fn test_like_rendered_record() {
        let author = Pubkey::new_unique();
        let mut buf = vec![0u8; CAPACITY];
        let format = Format::DEFAULT;
        let end = format.append(&mut buf, 2, b"Pfirst\0").unwrap();
        format.append(&mut buf, end, b"Psecond - part\0").unwrap();

        let board = format.decode(&buf).unwrap();
        let rendered =
            board.rendered(&author).map(|r| r.to_string()).collect::<Vec<_>>();
        assert_eq!(Ok(b"Lfirst\0".to_vec()), encode_like(&rendered[0]));

        // Body containing the delimiter can only be liked by reference.
        assert_eq!(
            Err(Error::MalformedReference(rendered[1].clone())),
            encode_like(&rendered[1])
        );
        let reference = Reference { source: author, record_index: 1 };
        let want = format!("L{author}:1\0");
        assert_eq!(want.as_bytes(), &encode_like_reference(&reference)[..]);
    }

    #[test]
    fn test_encode_like_reference() {
        let source = Pubkey::new_unique();
        let reference = Reference { source, record_index: 7 };
        let want = format!("L{source}:7\0");
        assert_eq!(want.as_bytes(), &encode_like_reference(&reference)[..]);
    }
}
