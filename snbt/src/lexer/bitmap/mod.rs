// SPDX-License-Identifier: Apache-2.0

//! The bitmap pre-pass.
//!
//! Every input byte gets one bit in each table, packed LSB-first into `u64`
//! words: byte `p` lives at bit `p % 64` of word `p / 64`. Classification is a
//! single forward pass; string masking then works a whole word at a time.

use alloc::vec;
use alloc::vec::Vec;

use super::bits::LowBits;
use crate::token::TokenKind;

const WORD_BITS: usize = 64;

/// Number of words backing a table for `len` input bytes. Always at least one.
pub(crate) const fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS) + 1
}

/// Word index and single-bit mask for byte position `pos`.
#[inline]
const fn locate(pos: usize) -> (usize, u64) {
    (pos / WORD_BITS, 1u64 << (pos % WORD_BITS))
}

/// Classified bitmaps for one input buffer.
///
/// All tables have the same length. Apart from the quote table, no token bit
/// is ever set inside a string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmaps {
    len: usize,
    quote: Vec<u64>,
    space: Vec<u64>,
    punct: [Vec<u64>; TokenKind::COUNT],
    string_mask: Vec<u64>,
}

#[derive(Debug, Default)]
struct QuoteState {
    in_single: bool,
    in_double: bool,
    escaped: bool,
}

impl Bitmaps {
    /// Runs both phases of the pre-pass over `raw`.
    pub fn build(raw: &[u8]) -> Self {
        let words = words_for(raw.len());
        let mut maps = Bitmaps {
            len: raw.len(),
            quote: vec![0; words],
            space: vec![0; words],
            punct: core::array::from_fn(|_| vec![0; words]),
            string_mask: vec![0; words],
        };
        maps.classify(raw);
        let unterminated = maps.mask_strings();
        if unterminated {
            log::debug!(
                "unterminated string literal, masking through end of input ({} bytes)",
                raw.len()
            );
        }
        log::debug!(
            "pre-pass: {} bytes, {} words, {} boundary quotes",
            raw.len(),
            words,
            super::bits::popcount(&maps.quote)
        );
        maps
    }

    /// Phase 1: set one bit per recognised byte. Punctuation inside strings is
    /// still recorded here and removed by [`Bitmaps::mask_strings`].
    fn classify(&mut self, raw: &[u8]) {
        let mut state = QuoteState::default();
        for (pos, &c) in raw.iter().enumerate() {
            let (idx, bit) = locate(pos);
            match c {
                b'\\' if !state.escaped => {
                    state.escaped = true;
                    continue;
                }
                b'\'' => {
                    if !state.escaped && !state.in_double {
                        state.in_single = !state.in_single;
                        set(&mut self.quote, idx, bit);
                    }
                }
                b'"' => {
                    if !state.escaped && !state.in_single {
                        state.in_double = !state.in_double;
                        set(&mut self.quote, idx, bit);
                    }
                }
                b' ' | b'\t' | b'\n' | b'\r' | 0x0C => set(&mut self.space, idx, bit),
                _ => {
                    if let Some(kind) = TokenKind::from_byte(c) {
                        if let Some(table) = self.punct.get_mut(kind.slot()) {
                            set(table, idx, bit);
                        }
                    }
                }
            }
            // An escaped backslash lands here too, so `\\` never escapes a quote
            state.escaped = false;
        }
    }

    /// Phase 2: derive the string interior from the quote table and clear every
    /// token bit that falls inside it.
    ///
    /// Returns true when the input ends inside a string literal.
    fn mask_strings(&mut self) -> bool {
        let mut quoted = false;
        for (w, &quotes) in self.quote.iter().enumerate() {
            let mut q = quotes;
            let mut mask = 0u64;
            while q != 0 {
                mask ^= q.smear_lowest();
                q = q.clear_lowest();
                quoted = !quoted;
            }
            if quoted {
                mask = !mask;
            }
            // Smearing leaves the closing quote inside the span
            mask &= !quotes;

            if let Some(slot) = self.string_mask.get_mut(w) {
                *slot = mask;
            }
            if let Some(word) = self.space.get_mut(w) {
                *word &= !mask;
            }
            for table in self.punct.iter_mut() {
                if let Some(word) = table.get_mut(w) {
                    *word &= !mask;
                }
            }
        }
        self.clear_tail();
        quoted
    }

    /// An unterminated literal inverts whole words; drop the bits past the end.
    fn clear_tail(&mut self) {
        let (idx, bit) = locate(self.len);
        if let Some(word) = self.string_mask.get_mut(idx) {
            *word &= bit - 1;
        }
        for word in self.string_mask.iter_mut().skip(idx + 1) {
            *word = 0;
        }
    }

    /// Length of the input these tables describe.
    pub fn input_len(&self) -> usize {
        self.len
    }

    /// Number of words in every table.
    pub fn word_count(&self) -> usize {
        self.string_mask.len()
    }

    /// Boundary quotes, the ones that open or close a literal.
    pub fn quote_tokens(&self) -> &[u64] {
        &self.quote
    }

    /// Whitespace outside string literals.
    pub fn space_tokens(&self) -> &[u64] {
        &self.space
    }

    /// Positions strictly between a pair of boundary quotes.
    pub fn string_mask(&self) -> &[u64] {
        &self.string_mask
    }

    /// The table for one punctuation kind.
    pub fn kind(&self, kind: TokenKind) -> &[u64] {
        self.punct.get(kind.slot()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of the punctuation tables at word `idx`; zero past the end.
    #[inline]
    pub fn significant(&self, idx: usize) -> u64 {
        self.punct
            .iter()
            .fold(0, |acc, table| acc | table.get(idx).copied().unwrap_or(0))
    }

    /// True if `pos` lies strictly inside a string literal.
    pub fn is_in_string(&self, pos: usize) -> bool {
        let (idx, bit) = locate(pos);
        self.string_mask.get(idx).is_some_and(|w| w & bit != 0)
    }

    /// Position of the first significant token at or after `from`.
    pub fn next_significant(&self, from: usize) -> Option<usize> {
        let mut idx = from / WORD_BITS;
        if idx >= self.word_count() {
            return None;
        }
        let mut w = self.significant(idx) & (u64::MAX << (from % WORD_BITS));
        while w == 0 && idx + 1 < self.word_count() {
            idx += 1;
            w = self.significant(idx);
        }
        if w == 0 {
            return None;
        }
        Some(idx * WORD_BITS + w.index_lowest() as usize)
    }
}

#[inline]
fn set(table: &mut [u64], idx: usize, bit: u64) {
    if let Some(word) = table.get_mut(idx) {
        *word |= bit;
    }
}

/// Iterator over the positions of the set bits in a table, in ascending order.
#[derive(Debug, Clone)]
pub struct SetBits<'a> {
    words: &'a [u64],
    idx: usize,
    word: u64,
}

impl<'a> SetBits<'a> {
    /// Starts at bit 0 of the first word.
    pub fn new(words: &'a [u64]) -> Self {
        SetBits {
            words,
            idx: 0,
            word: words.first().copied().unwrap_or(0),
        }
    }
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.word == 0 {
            self.idx += 1;
            self.word = *self.words.get(self.idx)?;
        }
        let pos = self.idx * WORD_BITS + self.word.index_lowest() as usize;
        self.word = self.word.clear_lowest();
        Some(pos)
    }
}

impl core::iter::FusedIterator for SetBits<'_> {}
