// SPDX-License-Identifier: Apache-2.0

/// The single-byte structural tokens of SNBT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`, opens a compound.
    LeftBrace,
    /// `}`, closes a compound.
    RightBrace,
    /// `[`, opens a list or typed array.
    LeftBracket,
    /// `]`, closes a list or typed array.
    RightBracket,
    /// `,`, separates elements.
    Comma,
    /// `:`, separates a key from its value.
    Colon,
    /// `;`, ends a typed array prefix (e.g. `[B; ...]`).
    Semicolon,
}

impl TokenKind {
    /// Number of token kinds, one bitmap each.
    pub const COUNT: usize = 7;

    /// Every kind, in bitmap order.
    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
        TokenKind::LeftBracket,
        TokenKind::RightBracket,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::Semicolon,
    ];

    /// The kind for a structural byte, `None` for anything else.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'{' => Some(TokenKind::LeftBrace),
            b'}' => Some(TokenKind::RightBrace),
            b'[' => Some(TokenKind::LeftBracket),
            b']' => Some(TokenKind::RightBracket),
            b',' => Some(TokenKind::Comma),
            b':' => Some(TokenKind::Colon),
            b';' => Some(TokenKind::Semicolon),
            _ => None,
        }
    }

    /// The byte this kind stands for.
    pub const fn as_byte(self) -> u8 {
        match self {
            TokenKind::LeftBrace => b'{',
            TokenKind::RightBrace => b'}',
            TokenKind::LeftBracket => b'[',
            TokenKind::RightBracket => b']',
            TokenKind::Comma => b',',
            TokenKind::Colon => b':',
            TokenKind::Semicolon => b';',
        }
    }

    /// Position of this kind's bitmap inside the pre-pass tables.
    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

/// A significant token: its byte offset and the byte found there.
///
/// Once the cursor runs past the last token it parks on the end sentinel,
/// `index == len` and `byte == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub index: usize,
    pub byte: u8,
}

impl Token {
    pub const fn new(index: usize, byte: u8) -> Self {
        Token { index, byte }
    }

    /// The end-of-input sentinel for a buffer of `len` bytes.
    pub const fn end(len: usize) -> Self {
        Token {
            index: len,
            byte: 0,
        }
    }

    /// True for the end-of-input sentinel. NUL is never a significant byte.
    pub const fn is_end(&self) -> bool {
        self.byte == 0
    }

    /// The structural kind of the byte, `None` for the end sentinel.
    pub const fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_byte(self.byte)
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_end() {
            write!(f, "end at {}", self.index)
        } else {
            write!(f, "'{}' at {}", self.byte as char, self.index)
        }
    }
}
