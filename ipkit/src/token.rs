// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A lexer for address and CIDR text which can consume from either end.
//!
//! IPv6 text cannot always be read left to right: a trailing `/mask`,
//! an embedded IPv4 tail, and the groups following a `::` are all easier
//! to recognise from the back. [`Tokenizer`] keeps a committed window over
//! the input which both ends eat into, plus a speculative peek window
//! that can later be adopted or thrown away.

/// The class of a lexed token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// Up to four digits, with the value in [`Token::value`].
    Number,
    Dot,
    Colon,
    DoubleColon,
    Slash,
    /// No input remains.
    End,
    /// A character which starts no token. Nothing is consumed.
    Unknown,
}

/// A single lexed token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    /// The numeric value of a [`TokenKind::Number`], zero otherwise.
    pub value: u16,
}

impl Token {
    pub const DOT: Self = Self::of(TokenKind::Dot);
    pub const COLON: Self = Self::of(TokenKind::Colon);
    pub const DOUBLE_COLON: Self = Self::of(TokenKind::DoubleColon);
    pub const SLASH: Self = Self::of(TokenKind::Slash);
    pub const END: Self = Self::of(TokenKind::End);
    pub const UNKNOWN: Self = Self::of(TokenKind::Unknown);

    const fn of(kind: TokenKind) -> Self {
        Self { kind, value: 0 }
    }

    /// A [`TokenKind::Number`] token.
    #[inline]
    pub const fn number(value: u16) -> Self {
        Self { kind: TokenKind::Number, value }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Which end of the input a read consumes from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Front,
    Back,
}

/// How digits of a number are recognised.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Radix {
    /// `0-9`. Hex letters lex as [`TokenKind::Unknown`].
    Decimal,
    /// `0-9`, `a-f` and `A-F`.
    Hexadecimal,
}

impl Radix {
    #[inline]
    const fn base(self) -> u32 {
        match self {
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    #[inline]
    fn digit(self, c: u8) -> Option<u32> {
        (c as char).to_digit(self.base())
    }
}

/// The maximum number of digits in a single number token.
pub const MAX_DIGITS: usize = 4;

/// Classifies the token at one end of `input`.
///
/// Returns the token and the number of bytes it spans, counted from that end.
pub fn lex(input: &[u8], direction: Direction, radix: Radix) -> (Token, usize) {
    let (first, second) = match direction {
        Direction::Front => (input.first(), input.get(1)),
        Direction::Back => {
            let second = input.len().checked_sub(2).and_then(|i| input.get(i));
            (input.last(), second)
        }
    };

    let Some(&first) = first else {
        return (Token::END, 0);
    };

    match first {
        b'/' => (Token::SLASH, 1),
        b'.' => (Token::DOT, 1),
        b':' if second == Some(&b':') => (Token::DOUBLE_COLON, 2),
        b':' => (Token::COLON, 1),
        c if radix.digit(c).is_some() => lex_number(input, direction, radix),
        _ => (Token::UNKNOWN, 0),
    }
}

fn lex_number(input: &[u8], direction: Direction, radix: Radix) -> (Token, usize) {
    let base = radix.base();
    let mut value = 0u32;
    let mut place = 1u32;
    let mut len = 0;

    while len < MAX_DIGITS.min(input.len()) {
        let c = match direction {
            Direction::Front => input[len],
            Direction::Back => input[input.len() - 1 - len],
        };
        let Some(digit) = radix.digit(c) else {
            break;
        };
        match direction {
            Direction::Front => value = value * base + digit,
            // Reading backwards, each digit outranks the ones before it.
            Direction::Back => {
                value += digit * place;
                place *= base;
            }
        }
        len += 1;
    }

    // At most four digits: 0xffff and 9999 both fit.
    (Token::number(value as u16), len)
}

fn consume(input: &[u8], direction: Direction, len: usize) -> &[u8] {
    match direction {
        Direction::Front => &input[len..],
        Direction::Back => &input[..input.len() - len],
    }
}

/// A cursor over address text which reads from either end.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    committed: &'a [u8],
    peeked: &'a [u8],
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { committed: input, peeked: input }
    }

    /// Reads and commits the next token from one end.
    ///
    /// Any outstanding peek is discarded.
    pub fn next(&mut self, direction: Direction, radix: Radix) -> Token {
        let (token, len) = lex(self.committed, direction, radix);
        self.committed = consume(self.committed, direction, len);
        self.peeked = self.committed;
        token
    }

    /// Reads the next token from one end without committing it.
    ///
    /// Successive peeks continue from the previous peek, so a caller can
    /// look several tokens ahead before choosing to [`adopt_peek`] or
    /// [`reset_peek`].
    ///
    /// [`adopt_peek`]: Self::adopt_peek
    /// [`reset_peek`]: Self::reset_peek
    pub fn peek(&mut self, direction: Direction, radix: Radix) -> Token {
        let (token, len) = lex(self.peeked, direction, radix);
        self.peeked = consume(self.peeked, direction, len);
        token
    }

    /// Commits everything consumed by peeking.
    #[inline]
    pub fn adopt_peek(&mut self) {
        self.committed = self.peeked;
    }

    /// Rewinds the peek window to the committed position.
    #[inline]
    pub fn reset_peek(&mut self) {
        self.peeked = self.committed;
    }

    /// The committed input not yet consumed from either end.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.committed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}
