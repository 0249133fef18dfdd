//! Some utility functions

use crate::feed::Feed;
use crate::settings::LINE_SEPARATOR;

/// Convert RFC 5545 line terminators to `\n`
pub fn universal_newlines(text: &str) -> String {
    text.replace(LINE_SEPARATOR, "\n")
}

/// A debug utility that pretty-prints the entries of a feed
pub fn print_entry_list(feed: &Feed) {
    println!("FEED {}", feed.summary());
    for entry in feed {
        println!("    * {}", entry.summary());
        for line in entry.lines().filter(|l| !l.is_empty()) {
            println!("        {}", line);
        }
    }
}
