//! This module handles the iCal text format itself: escaping of TEXT values, and splitting documents into components

pub mod text;
pub use text::{escape, unescape, EscapeTable};
pub mod scanner;
pub use scanner::{scan, BlockScanner, ScanError};
