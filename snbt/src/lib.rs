// SPDX-License-Identifier: Apache-2.0

//! A scanner for SNBT, the stringified form of Minecraft's NBT data.
//!
//! The scanner classifies the whole input into per-byte bitmaps in one pass,
//! masks off everything inside quoted literals, and then hands out the
//! structural punctuation (`{ } [ ] , : ;`) in document order through a cursor.
//! Building a value tree on top of the token stream is left to the caller.
//!
//! ```
//! use snbt::{ErrorKind, Scanner};
//!
//! let mut scanner = Scanner::new(br#"{"Hello World": {Name: "Steve"}}"#);
//! let mut bytes = vec![scanner.curr_token().byte];
//! loop {
//!     match scanner.advance() {
//!         Ok(()) => bytes.push(scanner.curr_token().byte),
//!         Err(e) if e.kind() == ErrorKind::StopIteration => break,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! assert_eq!(bytes, b"{:{:}}");
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod error;
pub use error::{Error, ErrorKind};

mod input_buffer;

mod lexer;
pub use lexer::{popcount, Bitmaps, LowBits, SetBits};

mod scanner;
pub use scanner::{Scanner, Tokens};

mod token;
pub use token::{Token, TokenKind};
