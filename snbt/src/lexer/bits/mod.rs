// SPDX-License-Identifier: Apache-2.0

//! Lowest-set-bit kernels used by the bitmap pre-pass and the token cursor.

/// Multiplier for the branchless bit index lookup: a perfect de Bruijn sequence
/// of order 6. `(1 << k) * DE_BRUIJN >> 58` is unique for every `k` in `0..64`.
const DE_BRUIJN: u64 = 0x03F5_66ED_2717_9461;

/// Inverse permutation of [`DE_BRUIJN`]: maps the top six bits of the product
/// back to the bit position that produced them.
const DE_BRUIJN_TABLE: [u8; 64] = [
    0, 1, 59, 2, 60, 40, 54, 3, 61, 32, 49, 41, 55, 19, 35, 4, //
    62, 52, 30, 33, 50, 12, 14, 42, 56, 16, 27, 20, 36, 23, 44, 5, //
    63, 58, 39, 53, 31, 48, 18, 34, 51, 29, 11, 13, 15, 26, 22, 43, //
    57, 38, 47, 17, 28, 10, 25, 21, 37, 46, 9, 24, 45, 8, 7, 6,
];

/// Lowest-set-bit operations over fixed width unsigned integers.
///
/// Implemented for all unsigned integer types up to 64 bits. The pre-pass only
/// ever uses `u64`, narrower widths are there for callers working on smaller
/// masks.
pub trait LowBits: Copy + PartialEq + core::fmt::Debug {
    /// The all-zeroes value of this width.
    const ZERO: Self;

    /// Clears the lowest set bit (`x & (x - 1)`). Zero stays zero.
    fn clear_lowest(self) -> Self;

    /// Keeps only the lowest set bit (`x & -x`). Zero stays zero.
    fn isolate_lowest(self) -> Self;

    /// Sets every bit at and below the lowest set bit (`x ^ (x - 1)`).
    ///
    /// Zero has no lowest set bit; the subtraction wraps and the result is
    /// all ones for the width.
    fn smear_lowest(self) -> Self;

    /// Zero-extends the value to 64 bits.
    fn widen(self) -> u64;

    /// Zero-based position of the lowest set bit.
    ///
    /// Returns 0 for a zero input, which is indistinguishable from an input of
    /// 1; callers must check for zero first.
    #[inline]
    fn index_lowest(self) -> u32 {
        let isolated = self.isolate_lowest().widen();
        let slot = isolated.wrapping_mul(DE_BRUIJN) >> 58;
        DE_BRUIJN_TABLE.get(slot as usize).copied().unwrap_or(0) as u32
    }
}

macro_rules! impl_low_bits {
    ($($t:ty),*) => {
        $(
            impl LowBits for $t {
                const ZERO: Self = 0;

                #[inline]
                fn clear_lowest(self) -> Self { self & self.wrapping_sub(1) }

                #[inline]
                fn isolate_lowest(self) -> Self { self & self.wrapping_neg() }

                #[inline]
                fn smear_lowest(self) -> Self { self ^ self.wrapping_sub(1) }

                #[inline]
                fn widen(self) -> u64 { self as u64 }
            }
        )*
    };
}

impl_low_bits!(u8, u16, u32, u64, usize);

/// Counts the set bits of a single 64-bit word with the SWAR reduction.
#[inline]
const fn popcount_word(x: u64) -> u32 {
    let x = x - ((x >> 1) & 0x5555_5555_5555_5555);
    let x = (x & 0x3333_3333_3333_3333) + ((x >> 2) & 0x3333_3333_3333_3333);
    let x = (x + (x >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    (x.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}

/// Total number of set bits across all `words`.
pub fn popcount<U: LowBits>(words: &[U]) -> u32 {
    words.iter().map(|w| popcount_word(w.widen())).sum()
}
