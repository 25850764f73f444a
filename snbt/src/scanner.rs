// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;

use crate::error::{Error, ErrorKind};
use crate::input_buffer::{self, InputBuffer};
use crate::lexer::{popcount, Bitmaps, SetBits};
use crate::token::Token;

/// A cursor over the structural tokens of an SNBT document.
///
/// All lexical work happens up front in [`Scanner::new`]: every byte is
/// classified into bitmaps and punctuation inside string literals is masked
/// off. Advancing the cursor afterwards is a handful of word operations.
///
/// # Example
/// ```
/// use snbt::Scanner;
///
/// let mut scanner = Scanner::new(br#"{name: "a,b", id: 3}"#);
/// assert_eq!(scanner.curr_token().byte, b'{');
/// scanner.advance().unwrap();
/// assert_eq!(scanner.curr_token().index, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    input: InputBuffer,
    bitmaps: Bitmaps,
    prev: Option<Token>,
    curr: Token,
}

impl Scanner {
    /// Scans a copy of `input`. Accepts any bytes, including an empty slice.
    pub fn new(input: &[u8]) -> Self {
        Self::from_vec(input.to_vec())
    }

    /// Scans `input` in place, taking ownership of the buffer.
    pub fn from_vec(input: Vec<u8>) -> Self {
        let bitmaps = Bitmaps::build(&input);
        let mut scanner = Scanner {
            input: InputBuffer::new(input),
            bitmaps,
            prev: None,
            curr: Token::end(0),
        };
        scanner.reset();
        scanner
    }

    /// Puts the cursor back on the first significant token.
    pub fn reset(&mut self) {
        self.prev = None;
        self.curr = self.token_from(0);
    }

    /// The token under the cursor, or the end sentinel once exhausted.
    pub fn curr_token(&self) -> Token {
        self.curr
    }

    /// The token the cursor was on before the last [`Scanner::advance`].
    ///
    /// `None` until the cursor has moved.
    pub fn prev_token(&self) -> Option<Token> {
        self.prev
    }

    /// Moves the cursor to the next significant token.
    ///
    /// Fails with [`ErrorKind::StopIteration`] when there is none; the cursor
    /// then rests on the end sentinel.
    pub fn advance(&mut self) -> Result<(), Error> {
        let prev = self.curr;
        let from = if prev.is_end() {
            self.len()
        } else {
            prev.index + 1
        };
        self.prev = Some(prev);
        self.curr = self.token_from(from);
        log::trace!("advance: {} -> {}", prev, self.curr);
        if self.curr.is_end() {
            return Error::new("next", ErrorKind::StopIteration);
        }
        Ok(())
    }

    /// First significant token at or after `from`, or the end sentinel.
    fn token_from(&self, from: usize) -> Token {
        self.bitmaps
            .next_significant(from)
            .and_then(|index| self.input.byte(index).ok().map(|b| Token::new(index, b)))
            .unwrap_or_else(|| Token::end(self.len()))
    }

    /// The byte at `index`.
    pub fn char(&self, index: usize) -> Result<u8, Error> {
        self.input
            .byte(index)
            .map_err(|e| Error::with_op("char", e.into()))
    }

    /// The bytes in `start..end`, borrowed from the scanner.
    ///
    /// `start == end` yields an empty slice; `start > end` or `end > len` fail.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[u8], Error> {
        self.input
            .slice(start, end)
            .map_err(|e| Error::with_op("slice", e.into()))
    }

    /// Removes every whitespace byte outside string literals, then rescans.
    ///
    /// Whitespace escaped by a backslash stays, so the backslash never ends up
    /// escaping the byte after it. Tokens keep their bytes and relative order;
    /// only their indices move. The cursor is reset to the first token.
    pub fn compact(&mut self) -> Result<(), Error> {
        let spaces = popcount(self.bitmaps.space_tokens()) as usize;
        let mut out = Vec::with_capacity(self.len().saturating_sub(spaces));
        let mut start = 0;
        for pos in SetBits::new(self.bitmaps.space_tokens()) {
            if self.is_escaped(pos) {
                continue;
            }
            let run = self.input.slice(start, pos).map_err(unexpected("compact"))?;
            out.extend_from_slice(run);
            start = pos + 1;
        }
        let tail = self
            .input
            .slice(start, self.len())
            .map_err(unexpected("compact"))?;
        out.extend_from_slice(tail);
        log::debug!(
            "compact: removed {} whitespace bytes, {} -> {}",
            self.len() - out.len(),
            self.len(),
            out.len()
        );

        self.bitmaps = Bitmaps::build(&out);
        self.input = InputBuffer::new(out);
        self.reset();
        Ok(())
    }

    /// True when the byte at `pos` follows an odd run of backslashes.
    fn is_escaped(&self, pos: usize) -> bool {
        let before = self.input.slice(0, pos).unwrap_or(&[]);
        let run = before.iter().rev().take_while(|&&b| b == b'\\').count();
        run % 2 == 1
    }

    /// Iterates every significant token from the start of the input.
    ///
    /// Independent of the cursor: it neither reads nor moves it.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            scanner: self,
            from: 0,
        }
    }

    /// Length of the current buffer in bytes.
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// True for an empty buffer, which has no tokens.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current buffer, compacted if [`Scanner::compact`] has run.
    pub fn as_bytes(&self) -> &[u8] {
        self.input.as_bytes()
    }

    /// Gives back the buffer without copying it.
    pub fn into_bytes(self) -> Vec<u8> {
        self.input.into_bytes()
    }

    /// The classified bitmaps for the current buffer.
    pub fn bitmaps(&self) -> &Bitmaps {
        &self.bitmaps
    }
}

/// Maps a buffer error the pre-pass rules out to [`ErrorKind::Unexpected`].
fn unexpected(op: &'static str) -> impl Fn(input_buffer::Error) -> Error {
    move |cause| {
        log::debug!("{}: impossible buffer state: {:?}", op, cause);
        Error::with_op(op, ErrorKind::Unexpected)
    }
}

impl From<&[u8]> for Scanner {
    fn from(input: &[u8]) -> Self {
        Scanner::new(input)
    }
}

impl From<&str> for Scanner {
    fn from(input: &str) -> Self {
        Scanner::new(input.as_bytes())
    }
}

impl From<Vec<u8>> for Scanner {
    fn from(input: Vec<u8>) -> Self {
        Scanner::from_vec(input)
    }
}

/// Iterator over the significant tokens of a [`Scanner`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    scanner: &'a Scanner,
    from: usize,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.scanner.token_from(self.from);
        if token.is_end() {
            self.from = self.scanner.len();
            return None;
        }
        self.from = token.index + 1;
        Some(token)
    }
}

impl core::iter::FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn collect(scanner: &mut Scanner) -> Vec<(usize, u8)> {
        let mut out = Vec::new();
        if scanner.curr_token().is_end() {
            return out;
        }
        loop {
            let t = scanner.curr_token();
            out.push((t.index, t.byte));
            if scanner.advance().is_err() {
                break;
            }
        }
        out
    }

    #[test]
    fn test_empty_input() {
        let mut scanner = Scanner::new(b"");
        assert!(scanner.is_empty());
        assert_eq!(scanner.curr_token(), Token::end(0));
        assert_eq!(scanner.prev_token(), None);
        let err = scanner.advance().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StopIteration);
        assert_eq!(err.op(), "next");
        assert_eq!(scanner.prev_token(), Some(Token::end(0)));
    }

    #[test]
    fn test_no_significant_tokens() {
        let mut scanner = Scanner::new(br#"  "{[,]}"  "#);
        assert_eq!(scanner.curr_token(), Token::end(11));
        assert!(scanner.advance().is_err());
        assert_eq!(scanner.tokens().count(), 0);
    }

    #[test]
    fn test_cursor_walk() {
        let mut scanner = Scanner::new(b"{a:[1,2]}");
        assert_eq!(scanner.curr_token(), Token::new(0, b'{'));
        assert_eq!(scanner.prev_token(), None);

        scanner.advance().unwrap();
        assert_eq!(scanner.prev_token(), Some(Token::new(0, b'{')));
        assert_eq!(scanner.curr_token(), Token::new(2, b':'));

        assert_eq!(
            collect(&mut scanner),
            [(2, b':'), (3, b'['), (5, b','), (7, b']'), (8, b'}')]
        );
        assert_eq!(scanner.curr_token(), Token::end(9));
        assert_eq!(scanner.prev_token(), Some(Token::new(8, b'}')));
    }

    #[test]
    fn test_advance_after_exhaustion_keeps_failing() {
        let mut scanner = Scanner::new(b"{}");
        scanner.advance().unwrap();
        assert!(scanner.advance().is_err());
        assert!(scanner.advance().is_err());
        assert_eq!(scanner.curr_token(), Token::end(2));
        assert_eq!(scanner.prev_token(), Some(Token::end(2)));
    }

    #[test]
    fn test_tokens_iterator_does_not_move_cursor() {
        let mut scanner = Scanner::new(b"[1, 2, 3]");
        scanner.advance().unwrap();
        let all: Vec<_> = scanner.tokens().map(|t| t.byte).collect();
        assert_eq!(all, b"[,,]");
        assert_eq!(scanner.curr_token(), Token::new(2, b','));
    }

    #[test]
    fn test_tokens_iterator_is_fused() {
        let scanner = Scanner::new(b"{}");
        let mut tokens = scanner.tokens();
        assert_eq!(tokens.next(), Some(Token::new(0, b'{')));
        assert_eq!(tokens.next(), Some(Token::new(1, b'}')));
        assert_eq!(tokens.next(), None);
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_char_and_slice_bounds() {
        let scanner = Scanner::from("{a: 1}");
        assert_eq!(scanner.char(0), Ok(b'{'));
        assert_eq!(scanner.char(5), Ok(b'}'));
        assert_eq!(
            scanner.char(6).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(scanner.slice(1, 3), Ok(&b"a:"[..]));
        assert_eq!(scanner.slice(6, 6), Ok(&b""[..]));
        let err = scanner.slice(3, 1).unwrap_err();
        assert_eq!(err.op(), "slice");
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(scanner.slice(0, 7).is_err());
    }

    #[test]
    fn test_compact_removes_only_outside_whitespace() {
        let mut scanner = Scanner::new(b"{ a : 'x y' ,\n\tb:[ 1 ] }");
        scanner.advance().unwrap();
        scanner.compact().unwrap();
        assert_eq!(scanner.as_bytes(), b"{a:'x y',b:[1]}");
        assert_eq!(scanner.curr_token(), Token::new(0, b'{'));
        assert_eq!(scanner.prev_token(), None);
    }

    #[test]
    fn test_compact_without_whitespace_is_identity() {
        let mut scanner = Scanner::new(b"{a:1}");
        scanner.compact().unwrap();
        assert_eq!(scanner.as_bytes(), b"{a:1}");
        let mut empty = Scanner::new(b"");
        empty.compact().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_compact_only_whitespace() {
        let mut scanner = Scanner::new(b" \t\r\n\x0c ");
        scanner.compact().unwrap();
        assert!(scanner.is_empty());
        assert_eq!(scanner.curr_token(), Token::end(0));
    }

    #[test]
    fn test_compact_keeps_escaped_whitespace() {
        let mut scanner = Scanner::new(br#"[a\ ",", 1]"#);
        scanner.compact().unwrap();
        assert_eq!(scanner.as_bytes(), br#"[a\ ",",1]"#);
        let bytes: Vec<_> = scanner.tokens().map(|t| t.byte).collect();
        assert_eq!(bytes, b"[,]");

        // An escaped backslash does not protect the space after it
        let mut scanner = Scanner::new(br#"[a\\ "x"]"#);
        scanner.compact().unwrap();
        assert_eq!(scanner.as_bytes(), br#"[a\\"x"]"#);
    }

    #[test]
    fn test_unexpected_keeps_the_operation() {
        let err = unexpected("compact")(input_buffer::Error::InvalidSliceBounds);
        assert_eq!(err.op(), "compact");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_into_bytes_round_trips_ownership() {
        let scanner = Scanner::from(b"[a, b]".to_vec());
        assert_eq!(scanner.into_bytes(), b"[a, b]");
    }
}
