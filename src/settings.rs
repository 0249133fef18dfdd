//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The `User-Agent` header sent when a [`Feed`](crate::feed::Feed) is fetched over HTTP, unless the feed was given its own.
/// Feel free to override it when initing this library.
pub static USER_AGENT: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new(
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
)));

/// The only content type a fetched document is allowed to declare
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar";

/// Line terminator mandated by RFC 5545
pub const LINE_SEPARATOR: &str = "\r\n";

/// Returns the current value of [`USER_AGENT`]
pub fn user_agent() -> String {
    match USER_AGENT.lock() {
        Ok(ua) => ua.clone(),
        // A poisoned lock still holds a usable string
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
