//! Tokenizer for command arguments.
//!
//! Splits on whitespace, honors single and double quotes (with backslash
//! escapes inside them) and recognizes `key=value` pairs.

use std::iter::Peekable;
use std::str::Chars;

/// A token parsed from command arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare or quoted word.
    Word(String),
    /// A `key=value` pair. The value may be quoted.
    KeyValue { key: String, value: String },
}

/// Tokenizes an argument string.
///
/// - `host=localhost` becomes `KeyValue { key: "host", value: "localhost" }`
/// - `password="my secret"` keeps the space inside the value
/// - `"a b"` becomes `Word("a b")`
/// - `key=` yields an empty value
///
/// Only the first unquoted `=` splits a token, so `password=a=b` has the
/// value `a=b`. An unterminated quote runs to the end of input.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let (head, split) = collect_until_equals(&mut chars);
        let token = if split {
            Token::KeyValue {
                key: head,
                value: collect_segment(&mut chars),
            }
        } else {
            Token::Word(head)
        };
        tokens.push(token);
    }

    tokens
}

/// Collects a token up to the first unquoted `=` or whitespace.
///
/// Returns the text and whether it stopped at `=`.
fn collect_until_equals(chars: &mut Peekable<Chars<'_>>) -> (String, bool) {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => return (out, false),
            '=' => {
                chars.next();
                return (out, true);
            }
            '"' | '\'' => {
                chars.next();
                out.push_str(&collect_quoted(chars, c));
            }
            _ => {
                chars.next();
                out.push(c);
            }
        }
    }
    (out, false)
}

/// Collects the rest of a token, `=` included, up to whitespace.
fn collect_segment(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();
        if c == '"' || c == '\'' {
            out.push_str(&collect_quoted(chars, c));
        } else {
            out.push(c);
        }
    }
    out
}

/// Collects characters up to the closing quote, resolving escapes.
fn collect_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> String {
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(e @ ('\\' | '"' | '\'')) => out.push(e),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            c if c == quote => break,
            c => out.push(c),
        }
    }
    out
}
