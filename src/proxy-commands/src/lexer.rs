//! Command-line tokenizer.
//!
//! Splits a command line into words with POSIX-like quoting. There is no
//! comment syntax and `.` is an ordinary word character, so dotted command
//! paths such as `flow.resume` never need quoting.
//!
//! Unlike `shlex::split`, the lexer reports the byte offset at which a
//! malformed token starts. Partial parsing relies on this to keep the
//! unparsable tail of an in-progress line as a literal token.

use std::borrow::Cow;

use thiserror::Error;

/// Lexical errors. Each carries the byte offset of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A quoted section was never closed.
    #[error("No closing quotation at offset {offset}")]
    UnclosedQuote { offset: usize },

    /// The line ended right after an escape character.
    #[error("No escaped character at offset {offset}")]
    TrailingEscape { offset: usize },
}

impl LexError {
    /// Byte offset where the malformed token starts.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnclosedQuote { offset } | Self::TrailingEscape { offset } => *offset,
        }
    }
}

/// A single word of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The unquoted, unescaped text.
    pub value: String,
    /// Byte offset of the first character of the raw token.
    pub start: usize,
    /// Byte offset one past the last character of the raw token.
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Word,
    Single,
    Double,
}

/// Streaming tokenizer over a command line.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Read the next token.
    ///
    /// Returns `Ok(None)` once the input is exhausted. After an error the
    /// lexer is exhausted as well.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let input = self.input;
        let rest = &input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
        if self.pos >= input.len() {
            return Ok(None);
        }

        let start = self.pos;
        let mut end = input.len();
        let mut value = String::new();
        let mut state = State::Word;
        let mut chars = input[start..].char_indices();

        while let Some((i, c)) = chars.next() {
            match state {
                State::Word => match c {
                    c if c.is_whitespace() => {
                        end = start + i;
                        break;
                    }
                    '\'' => state = State::Single,
                    '"' => state = State::Double,
                    '\\' => match chars.next() {
                        Some((_, '\n')) => {}
                        Some((_, escaped)) => value.push(escaped),
                        None => return self.fail(LexError::TrailingEscape { offset: start }),
                    },
                    c => value.push(c),
                },
                State::Single => match c {
                    '\'' => state = State::Word,
                    c => value.push(c),
                },
                State::Double => match c {
                    '"' => state = State::Word,
                    '\\' => match chars.next() {
                        Some((_, escaped @ ('"' | '\\' | '$' | '`'))) => value.push(escaped),
                        Some((_, '\n')) => {}
                        Some((_, other)) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => return self.fail(LexError::UnclosedQuote { offset: start }),
                    },
                    c => value.push(c),
                },
            }
        }

        if state != State::Word {
            return self.fail(LexError::UnclosedQuote { offset: start });
        }

        self.pos = end;
        Ok(Some(Token { value, start, end }))
    }

    fn fail(&mut self, err: LexError) -> Result<Option<Token>, LexError> {
        self.pos = self.input.len();
        Err(err)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Split a complete command line into unquoted words.
pub fn split(input: &str) -> Result<Vec<String>, LexError> {
    Lexer::new(input)
        .map(|token| token.map(|t| t.value))
        .collect()
}

/// Quote a single word so that [`split`] reads it back unchanged.
pub fn quote(word: &str) -> Cow<'_, str> {
    // try_quote only rejects interior NUL bytes, which single quotes carry fine.
    shlex::try_quote(word)
        .unwrap_or_else(|_| Cow::Owned(format!("'{}'", word.replace('\'', r"'\''"))))
}

/// Render words back into a command line.
pub fn join<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| quote(w.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
