//! Scanning of instruction text.
//!
//! Nothing is tokenized ahead of time: a [`Buffer`] hands out one token at a time from the front
//! of its remaining text, so a malformed list at the end of a line is only noticed once evaluation
//! actually reaches it.

use nom::{combinator::all_consuming, number::complete::double};

use crate::typ::{Error, Value};

/// One logical token at the front of a buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A run of non-separator characters, like `FD`, `:SIDE`, `"X` or `90`.
    Word(String),
    /// A bracketed list; this is the text between the outer brackets.
    List(String),
    /// A value that was spliced back in by an earlier call.
    Value(Value),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::List(l) => f.write_fmt(format_args!("[{l}]")),
            Token::Value(v) => v.fmt(f),
        }
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '[' || c == ']'
}

/// Uppercase a line and collapse its whitespace.
///
/// This happens exactly once, when a line (or a line of a procedure body) is accepted.
pub fn normalize(line: &str) -> String {
    line.to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The offset of the first separator in `s`, or `s.len()` if there isn't one.
pub fn word_boundary(s: &str) -> usize {
    s.find(is_separator).unwrap_or(s.len())
}

/// Given text starting with `[`, find the offset of the matching `]`.
///
/// This counts brackets rather than recursing, so nesting depth is bounded only by the text.
pub fn list_span(s: &str) -> Result<usize, Error> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1).ok_or(Error::MalformedList)?;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ if depth == 0 => return Err(Error::MalformedList),
            _ => {}
        }
    }
    Err(Error::MalformedList)
}

/// Parses a numeric literal. The whole word has to be a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    all_consuming(double::<&str, nom::error::Error<&str>>)(s)
        .ok()
        .map(|(_, x)| x)
        .filter(|x| x.is_finite())
}

/// Scan the token at the very start of `s`, returning it along with its length in bytes.
fn scan_token(s: &str) -> Result<Option<(Token, usize)>, Error> {
    match s.chars().next() {
        None => Ok(None),
        Some('[') => {
            let end = list_span(s)?;
            Ok(Some((Token::List(s[1..end].trim().to_owned()), end + 1)))
        }
        Some(']') => Err(Error::MalformedList),
        Some(_) => {
            let end = word_boundary(s);
            Ok(Some((Token::Word(s[..end].to_owned()), end)))
        }
    }
}

/// The remaining work of one evaluation frame.
#[derive(Clone, Debug, Default)]
pub struct Buffer {
    text: String,
    pos: usize,
    // Spliced values, with the front-most at the end.
    front: Vec<Value>,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Buffer {
        let mut ret = Buffer {
            text: text.into(),
            pos: 0,
            front: Vec::new(),
        };
        ret.skip_whitespace();
        ret
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// The unscanned text, not counting any spliced values.
    pub fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.rest().is_empty()
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Result<Option<Token>, Error> {
        if let Some(v) = self.front.last() {
            return Ok(Some(Token::Value(v.clone())));
        }
        Ok(scan_token(self.rest())?.map(|(tok, _)| tok))
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        if let Some(v) = self.front.pop() {
            return Ok(Some(Token::Value(v)));
        }
        let Some((tok, len)) = scan_token(self.rest())? else {
            return Ok(None);
        };
        log::trace!("token {tok}");
        self.pos += len;
        self.skip_whitespace();
        Ok(Some(tok))
    }

    /// Insert a value in front of everything else, so that it is the next token.
    pub fn splice(&mut self, val: Value) {
        self.front.push(val);
    }

    /// Remove `n` logical tokens from the front (a list counts as one).
    pub fn remove_leading(&mut self, n: usize) -> Result<(), Error> {
        for _ in 0..n {
            if self.next_token()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Take everything that's left, as text.
    pub fn take_rest(&mut self) -> String {
        let mut parts: Vec<String> = self.front.drain(..).rev().map(|v| v.to_string()).collect();
        if !self.rest().is_empty() {
            parts.push(self.rest().to_owned());
        }
        self.pos = self.text.len();
        parts.join(" ")
    }

    pub fn clear(&mut self) {
        self.front.clear();
        self.pos = self.text.len();
    }
}
