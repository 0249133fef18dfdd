//! This crate reads iCalendar (RFC 5545) feeds.
//!
//! It provides the TEXT escaping codec in the [`ical::text`] module, and a scanner that splits a document into its top-level components (events, todos...) in the [`ical::scanner`] module.
//!
//! A [`Feed`](feed::Feed) ties these together: it retrieves a document from an URL (`http`, `https` or `file`), checks that it is declared as `text/calendar`, and splits it into [`Entry`] items. \
//! Interpreting the properties of an entry is left to the caller, e.g. with the [`DataType`](traits::DataType) implementors of [`ical::text`].

pub mod traits;

pub mod ical;
mod entry;
pub use entry::Entry;
pub mod feed;
pub use feed::Feed;

pub mod settings;
pub mod utils;
