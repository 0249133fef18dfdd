//! A module to split an iCal document into its top-level components
//!
//! The scanner only looks at `BEGIN:`/`END:` lines. It tracks nesting to any depth, but only captures depth-2 blocks,
//! i.e. the components directly wrapped by the root block (usually `VCALENDAR`), whatever the root type is.

use std::mem;

use thiserror::Error;

use crate::entry::Entry;
use crate::settings::LINE_SEPARATOR;

const BEGIN: &str = "BEGIN:";
const END: &str = "END:";

/// Structural errors. Line numbers start at 1.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("double entry by line {line}")]
    DuplicateEntry { line: usize },
    #[error("closing {block_type} on line {line}, but current stack is {stack:?}")]
    UnmatchedClose { block_type: String, line: usize, stack: Vec<String> },
    #[error("document ended with unterminated blocks {stack:?}")]
    Unterminated { stack: Vec<String> },
}


/// The entry being accumulated while the scanner is inside a depth-2 block
#[derive(Clone, Debug, PartialEq)]
struct PendingEntry {
    entry_type: String,
    lines: Vec<String>,
}

impl PendingEntry {
    fn new(entry_type: String) -> Self {
        Self { entry_type, lines: Vec::new() }
    }

    fn finalize(mut self) -> Entry {
        // trailing blank line
        self.lines.push(String::new());
        Entry::new(self.entry_type, self.lines.join(LINE_SEPARATOR))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum State {
    /// Outside of any block
    Idle,
    /// Inside the root block, between two entries
    InRoot,
    /// Inside an entry, at any depth
    InEntry(PendingEntry),
}


/// A state machine that is fed the lines of a single document, in order.
///
/// Each scanner holds the state of one document and must not be reused for another one.
#[derive(Debug)]
pub struct BlockScanner {
    stack: Vec<String>,
    state: State,
    line_number: usize,
}

impl Default for BlockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockScanner {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            state: State::Idle,
            line_number: 0,
        }
    }

    /// The current nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The types of the currently open blocks, outermost first
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Process the next line of the document (without its line terminator).
    ///
    /// Returns the entry this line completes, if any.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<Entry>, ScanError> {
        self.line_number += 1;

        if let Some(block_type) = line.strip_prefix(BEGIN) {
            self.open(block_type)?;
        }

        if let State::InEntry(pending) = &mut self.state {
            pending.lines.push(line.to_string());
        }

        let completed = match line.strip_prefix(END) {
            Some(block_type) => self.close(block_type)?,
            None => None,
        };

        log::trace!("{:?}", self.stack);
        Ok(completed)
    }

    /// Check that the document did not end in the middle of a block
    pub fn finish(self) -> Result<(), ScanError> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(ScanError::Unterminated { stack: self.stack })
        }
    }

    fn open(&mut self, block_type: &str) -> Result<(), ScanError> {
        log::info!("begin {}", block_type);
        self.stack.push(block_type.to_string());

        match self.stack.len() {
            1 => self.state = State::InRoot,
            2 => {
                if let State::InEntry(_) = self.state {
                    return Err(ScanError::DuplicateEntry { line: self.line_number });
                }
                self.state = State::InEntry(PendingEntry::new(block_type.to_string()));
            },
            _ => {},
        }
        Ok(())
    }

    fn close(&mut self, block_type: &str) -> Result<Option<Entry>, ScanError> {
        log::info!("end {}", block_type);
        if self.stack.last().map(|s| s.as_str()) != Some(block_type) {
            return Err(ScanError::UnmatchedClose {
                block_type: block_type.to_string(),
                line: self.line_number,
                stack: self.stack.clone(),
            });
        }
        self.stack.pop();

        match self.stack.len() {
            0 => {
                self.state = State::Idle;
                Ok(None)
            },
            1 => match mem::replace(&mut self.state, State::InRoot) {
                State::InEntry(pending) => Ok(Some(pending.finalize())),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}


/// Split a CRLF-delimited document into its top-level entries, in document order
pub fn scan(document: &str) -> Result<Vec<Entry>, ScanError> {
    let mut scanner = BlockScanner::new();
    let mut entries = Vec::new();

    for line in document.split(LINE_SEPARATOR) {
        if let Some(entry) = scanner.feed_line(line)? {
            entries.push(entry);
        }
    }
    scanner.finish()?;

    log::debug!("found {} entries", entries.len());
    Ok(entries)
}
