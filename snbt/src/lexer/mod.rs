// SPDX-License-Identifier: Apache-2.0

mod bitmap;
mod bits;

pub use bitmap::{Bitmaps, SetBits};
pub use bits::{popcount, LowBits};
