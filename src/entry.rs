//! Top-level calendar components (events, todos, journals...)

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::settings::LINE_SEPARATOR;
use crate::utils::universal_newlines;

/// A `BEGIN:<type> ... END:<type>` block found right under the root of a document.
///
/// Its content is kept raw, CRLF-separated and ending with an empty line; interpreting its properties is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    entry_type: String,
    content: String,
}

impl Entry {
    pub fn new(entry_type: String, content: String) -> Self {
        Self { entry_type, content }
    }

    /// The block type name (e.g. `VEVENT`)
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// The raw lines of this entry, joined by CRLF
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The raw lines of this entry, from its `BEGIN:` line to the trailing empty line
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split(LINE_SEPARATOR)
    }

    /// A short description, e.g. `<Entry type:VEVENT>`
    pub fn summary(&self) -> String {
        format!("<Entry type:{}>", self.entry_type)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", universal_newlines(&self.content).trim_end())
    }
}
