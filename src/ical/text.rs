//! Escaping of TEXT values
//!
//! As defined in RFC 5545, section 3.3.11 (Text).
//!
//! Encoding always uses the first spelling listed for a character, while decoding accepts every listed spelling.
//! Since a newline decodes from both `\n` and `\N`, `unescape(escape(x)) == x` always holds,
//! but `escape(unescape(y)) == y` only holds when `y` uses the canonical spellings.

use std::collections::HashMap;
use std::convert::Infallible;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::traits::DataType;

/// The escapes of RFC 5545 section 3.3.11. The first spelling of each character is the one used when encoding.
const RFC5545_ESCAPES: &[(char, &[&str])] = &[
    ('\\', &[r"\\"]),
    ('\n', &[r"\n", r"\N"]),
    (';', &[r"\;"]),
    (',', &[r"\,"]),
];

/// The process-wide table, built the first time it is used
pub static TEXT_ESCAPES: Lazy<EscapeTable> = Lazy::new(|| {
    EscapeTable::rfc5545().expect("the RFC 5545 escape table is malformed")
});

/// Convert a string to RFC 5545-compliant text
pub fn escape(text: &str) -> String {
    TEXT_ESCAPES.escape(text)
}

/// Convert RFC 5545-compliant text to a string
pub fn unescape(text: &str) -> String {
    TEXT_ESCAPES.unescape(text)
}


/// Reasons why an escape table cannot be built
#[derive(Debug, Error)]
pub enum TableError {
    #[error("the escape table is empty")]
    Empty,
    #[error("{character:?} has no escape spelling")]
    NoSpelling { character: char },
    #[error("{spelling:?} escape value is not two characters long")]
    WrongLength { spelling: String },
    #[error("{spelling:?} escape does not begin with a backslash")]
    MissingBackslash { spelling: String },
    #[error("{spelling:?} is used both by {first:?} and {second:?}")]
    Collision { spelling: String, first: char, second: char },
    #[error("{character:?} is listed more than once")]
    DuplicateCharacter { character: char },
    #[error("unable to compile the substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}


/// A forward table (character to escape spellings) and its reverse (escape spelling to character)
#[derive(Debug)]
pub struct EscapeTable {
    escapes: Vec<(char, Vec<String>)>,
    unescapes: HashMap<String, char>,
    escape_regex: Regex,
    unescape_regex: Regex,
}

impl EscapeTable {
    /// Build a table from `(character, spellings)` pairs.
    ///
    /// Each character may only be listed once.
    /// Every spelling must be a backslash followed by exactly one character, and no spelling may be shared between characters.
    pub fn new<I, S>(pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (char, Vec<S>)>,
        S: Into<String>,
    {
        let mut escapes = Vec::new();
        let mut unescapes = HashMap::new();

        for (character, spellings) in pairs {
            if escapes.iter().any(|(c, _)| *c == character) {
                return Err(TableError::DuplicateCharacter { character });
            }
            let spellings: Vec<String> = spellings.into_iter().map(Into::into).collect();
            if spellings.is_empty() {
                return Err(TableError::NoSpelling { character });
            }
            for spelling in &spellings {
                let mut chars = spelling.chars();
                if spelling.chars().count() != 2 {
                    return Err(TableError::WrongLength { spelling: spelling.clone() });
                }
                if chars.next() != Some('\\') {
                    return Err(TableError::MissingBackslash { spelling: spelling.clone() });
                }
                if let Some(first) = unescapes.insert(spelling.clone(), character) {
                    return Err(TableError::Collision { spelling: spelling.clone(), first, second: character });
                }
            }
            escapes.push((character, spellings));
        }

        if escapes.is_empty() {
            return Err(TableError::Empty);
        }

        let escape_pattern = format!("({})",
            escapes.iter()
                .map(|(character, _)| regex::escape(&character.to_string()))
                .collect::<Vec<_>>()
                .join("|")
        );
        log::debug!("text-escape regexp: {:?}", escape_pattern);

        // Sorted so that the pattern does not depend on the hash map ordering
        let mut seconds: Vec<String> = unescapes.keys()
            .filter_map(|spelling| spelling.chars().nth(1))
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        seconds.sort();
        let unescape_pattern = format!(r"(\\({}))", seconds.join("|"));
        log::debug!("text-unescape regexp: {:?}", unescape_pattern);

        Ok(Self {
            escapes,
            unescapes,
            escape_regex: Regex::new(&escape_pattern)?,
            unescape_regex: Regex::new(&unescape_pattern)?,
        })
    }

    /// Build the table of RFC 5545 section 3.3.11
    pub fn rfc5545() -> Result<Self, TableError> {
        Self::new(RFC5545_ESCAPES.iter().map(|(c, spellings)| (*c, spellings.to_vec())))
    }

    /// The spelling `character` is encoded to, if it needs escaping at all
    pub fn canonical(&self, character: char) -> Option<&str> {
        self.escapes.iter()
            .find(|(c, _)| *c == character)
            .and_then(|(_, spellings)| spellings.first())
            .map(|s| s.as_str())
    }

    /// The character a two-character escape spelling decodes to
    pub fn source_of(&self, spelling: &str) -> Option<char> {
        self.unescapes.get(spelling).copied()
    }

    /// Replace every character of the table by its canonical spelling.
    /// Inserted spellings are never scanned again.
    pub fn escape(&self, text: &str) -> String {
        self.escape_regex.replace_all(text, |caps: &Captures| {
            let matched = &caps[1];
            matched.chars().next()
                .and_then(|c| self.canonical(c))
                .unwrap_or(matched)
                .to_string()
        }).into_owned()
    }

    /// Replace every known escape spelling by its character.
    /// Unknown spellings and lone backslashes are left as they are.
    pub fn unescape(&self, text: &str) -> String {
        self.unescape_regex.replace_all(text, |caps: &Captures| {
            let matched = &caps[1];
            match self.source_of(matched) {
                Some(c) => c.to_string(),
                None => matched.to_string(),
            }
        }).into_owned()
    }
}


/// The TEXT value type
pub struct Text;

impl DataType for Text {
    const NAME: &'static str = "TEXT";
    type Value = String;
    type Error = Infallible;

    fn decode(_property: &str, raw: &str) -> Result<String, Infallible> {
        Ok(unescape(raw))
    }

    fn encode(_property: &str, value: &String) -> String {
        escape(value)
    }
}

/// The URI value type, which is processed as TEXT
pub struct Uri;

impl DataType for Uri {
    const NAME: &'static str = "URI";
    type Value = String;
    type Error = Infallible;

    fn decode(property: &str, raw: &str) -> Result<String, Infallible> {
        Text::decode(property, raw)
    }

    fn encode(property: &str, value: &String) -> String {
        Text::encode(property, value)
    }
}
