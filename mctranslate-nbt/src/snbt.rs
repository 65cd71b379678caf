//! Stringified NBT.
//!
//! The printer produces the canonical form used as a lookup key by the rule
//! interpreter: compound keys sorted, strings always double quoted, every
//! non-int number suffixed. The parser accepts the usual hand-written
//! variations (bare strings, single quotes, `true`/`false`, whitespace) so that
//! rule files can be canonicalised once at load time.

use std::fmt::{self, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::tag::{Compound, List, Tag, TagKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnbtError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character {found:?} at position {position}")]
    Unexpected { found: char, position: usize },
    #[error("list mixes {first} and {second} elements")]
    MixedList { first: TagKind, second: TagKind },
    #[error("{value} is not a valid {kind} element")]
    ArrayElement { kind: TagKind, value: String },
    #[error("trailing data at position {0}")]
    Trailing(usize),
}

/// Parse a complete SNBT string.
pub fn from_snbt(input: &str) -> Result<Tag, SnbtError> {
    let mut parser = Parser { src: input, pos: 0 };
    let tag = parser.value()?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(SnbtError::Trailing(parser.pos));
    }
    Ok(tag)
}

impl FromStr for Tag {
    type Err = SnbtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_snbt(s)
    }
}

impl Tag {
    /// Canonical stringified form.
    pub fn to_snbt(&self) -> String {
        self.to_string()
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if !key.is_empty() && key.chars().all(is_bare_char) {
        f.write_str(key)
    } else {
        write_quoted(f, key)
    }
}

fn write_array<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    prefix: char,
    suffix: &str,
    values: &[T],
) -> fmt::Result {
    write!(f, "[{prefix};")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{v}{suffix}")?;
    }
    f.write_char(']')
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{v}b"),
            Tag::Short(v) => write!(f, "{v}s"),
            Tag::Int(v) => write!(f, "{v}"),
            Tag::Long(v) => write!(f, "{v}L"),
            // Debug keeps a trailing ".0" on integral floats.
            Tag::Float(v) => write!(f, "{v:?}f"),
            Tag::Double(v) => write!(f, "{v:?}d"),
            Tag::String(s) => write_quoted(f, s),
            Tag::ByteArray(values) => write_array(f, 'B', "b", values),
            Tag::IntArray(values) => write_array(f, 'I', "", values),
            Tag::LongArray(values) => write_array(f, 'L', "L", values),
            Tag::List(list) => {
                f.write_char('[')?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Tag::Compound(compound) => {
                f.write_char('{')?;
                for (i, (key, value)) in compound.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_key(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> SnbtError {
        match self.peek() {
            Some(found) => SnbtError::Unexpected {
                found,
                position: self.pos,
            },
            None => SnbtError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SnbtError> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn value(&mut self) -> Result<Tag, SnbtError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(SnbtError::UnexpectedEnd),
            Some('{') => self.compound(),
            Some('[') => self.list_or_array(),
            Some('"') | Some('\'') => self.quoted().map(Tag::String),
            Some(_) => {
                let start = self.pos;
                let word = self.bare();
                if word.is_empty() {
                    self.pos = start;
                    return Err(self.unexpected());
                }
                Ok(classify(word))
            }
        }
    }

    fn bare(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_bare_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn quoted(&mut self) -> Result<String, SnbtError> {
        let quote = self.bump().ok_or(SnbtError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SnbtError::UnexpectedEnd),
                Some('\\') => match self.bump() {
                    None => return Err(SnbtError::UnexpectedEnd),
                    Some('n') => out.push('\n'),
                    Some(c) => out.push(c),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn key(&mut self) -> Result<String, SnbtError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => self.quoted(),
            _ => {
                let word = self.bare();
                if word.is_empty() {
                    Err(self.unexpected())
                } else {
                    Ok(word.to_string())
                }
            }
        }
    }

    fn compound(&mut self) -> Result<Tag, SnbtError> {
        self.expect('{')?;
        let mut compound = Compound::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Tag::Compound(compound));
        }
        loop {
            let key = self.key()?;
            self.expect(':')?;
            let value = self.value()?;
            compound.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Tag::Compound(compound)),
                Some(found) => {
                    return Err(SnbtError::Unexpected {
                        found,
                        position: self.pos - found.len_utf8(),
                    });
                }
                None => return Err(SnbtError::UnexpectedEnd),
            }
        }
    }

    /// Comma separated values up to the closing bracket.
    fn elements(&mut self) -> Result<Vec<Tag>, SnbtError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(items),
                Some(found) => {
                    return Err(SnbtError::Unexpected {
                        found,
                        position: self.pos - found.len_utf8(),
                    });
                }
                None => return Err(SnbtError::UnexpectedEnd),
            }
        }
    }

    fn list_or_array(&mut self) -> Result<Tag, SnbtError> {
        self.expect('[')?;
        let rest = &self.src[self.pos..];
        let array_kind = match rest.get(..2) {
            Some("B;") => Some(TagKind::ByteArray),
            Some("I;") => Some(TagKind::IntArray),
            Some("L;") => Some(TagKind::LongArray),
            _ => None,
        };

        let Some(kind) = array_kind else {
            let items = self.elements()?;
            return match List::from_homogeneous(items.clone()) {
                Some(list) => Ok(Tag::List(list)),
                None => {
                    let first = items[0].kind();
                    let second = items
                        .iter()
                        .map(Tag::kind)
                        .find(|k| *k != first)
                        .unwrap_or(first);
                    Err(SnbtError::MixedList { first, second })
                }
            };
        };

        self.pos += 2;
        let items = self.elements()?;
        let bad = |tag: &Tag| SnbtError::ArrayElement {
            kind,
            value: tag.to_snbt(),
        };
        match kind {
            TagKind::ByteArray => items
                .iter()
                .map(|t| match t {
                    Tag::Byte(v) => Ok(*v),
                    _ => Err(bad(t)),
                })
                .collect::<Result<Vec<i8>, _>>()
                .map(Tag::ByteArray),
            TagKind::IntArray => items
                .iter()
                .map(|t| match t {
                    Tag::Int(v) => Ok(*v),
                    _ => Err(bad(t)),
                })
                .collect::<Result<Vec<i32>, _>>()
                .map(Tag::IntArray),
            _ => items
                .iter()
                .map(|t| match t {
                    Tag::Long(v) => Ok(*v),
                    Tag::Int(v) => Ok(i64::from(*v)),
                    _ => Err(bad(t)),
                })
                .collect::<Result<Vec<i64>, _>>()
                .map(Tag::LongArray),
        }
    }
}

fn looks_numeric(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

/// Turn a bare word into a number, a boolean byte, or a string.
fn classify(word: &str) -> Tag {
    match word {
        "true" => return Tag::Byte(1),
        "false" => return Tag::Byte(0),
        _ => {}
    }
    if !looks_numeric(word) {
        return Tag::String(word.to_string());
    }

    let (body, suffix) = word.split_at(word.len() - 1);
    let parsed = match suffix {
        "b" | "B" => body.parse().ok().map(Tag::Byte),
        "s" | "S" => body.parse().ok().map(Tag::Short),
        "l" | "L" => body.parse().ok().map(Tag::Long),
        "f" | "F" if looks_numeric(body) => body.parse().ok().map(Tag::Float),
        "d" | "D" if looks_numeric(body) => body.parse().ok().map(Tag::Double),
        _ => None,
    };
    if let Some(tag) = parsed {
        return tag;
    }
    if let Ok(v) = word.parse::<i32>() {
        return Tag::Int(v);
    }
    if word.contains('.') {
        if let Ok(v) = word.parse::<f64>() {
            return Tag::Double(v);
        }
    }
    Tag::String(word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(from_snbt("1b").expect("byte"), Tag::Byte(1));
        assert_eq!(from_snbt("-3s").expect("short"), Tag::Short(-3));
        assert_eq!(from_snbt("42").expect("int"), Tag::Int(42));
        assert_eq!(from_snbt("7L").expect("long"), Tag::Long(7));
        assert_eq!(from_snbt("1.5f").expect("float"), Tag::Float(1.5));
        assert_eq!(from_snbt("2.25").expect("double"), Tag::Double(2.25));
        assert_eq!(from_snbt("true").expect("bool"), Tag::Byte(1));
        assert_eq!(from_snbt("oak").expect("bare"), Tag::string("oak"));
        assert_eq!(from_snbt("'y'").expect("quoted"), Tag::string("y"));
    }

    #[test]
    fn test_words_that_are_not_numbers() {
        assert_eq!(from_snbt("infinity").expect("bare"), Tag::string("infinity"));
        assert_eq!(from_snbt("1.2.3").expect("bare"), Tag::string("1.2.3"));
        assert_eq!(from_snbt("3000000000").expect("bare"), Tag::string("3000000000"));
    }

    #[test]
    fn test_canonical_printing() {
        let tag = from_snbt("{ b : 'x', a : [ 1, 2 ], \"c d\": [B; 1b, 2b], e: 3.0d }")
            .expect("compound");
        assert_eq!(tag.to_snbt(), "{a:[1,2],b:\"x\",\"c d\":[B;1b,2b],e:3.0d}");
        assert_eq!(Tag::Float(1.0).to_snbt(), "1.0f");
        assert_eq!(Tag::string("say \"hi\"").to_snbt(), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_canonical_form_is_stable() {
        for text in ["{utags:{}}", "[L;1L,-2L]", "\"north\"", "[[1s],[]]", "{x:[I;]}"] {
            let tag = from_snbt(text).expect("valid snbt");
            let printed = tag.to_snbt();
            assert_eq!(from_snbt(&printed).expect("reparse"), tag, "{text}");
            assert_eq!(printed, text);
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            from_snbt("[1, \"a\"]"),
            Err(SnbtError::MixedList {
                first: TagKind::Int,
                second: TagKind::String
            })
        );
        assert!(matches!(from_snbt("{a:1"), Err(SnbtError::UnexpectedEnd)));
        assert!(matches!(from_snbt("1 2"), Err(SnbtError::Trailing(2))));
        assert!(matches!(
            from_snbt("[B;1,2]"),
            Err(SnbtError::ArrayElement { kind: TagKind::ByteArray, .. })
        ));
        assert!(matches!(from_snbt("{:1}"), Err(SnbtError::Unexpected { found: ':', .. })));
    }
}
