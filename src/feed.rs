//! This module provides an iCalendar feed, that retrieves a document and splits it into entries

use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;
use std::string::FromUtf8Error;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use thiserror::Error;
use url::Url;

use crate::entry::Entry;
use crate::ical::scanner::{scan, ScanError};
use crate::settings::CALENDAR_CONTENT_TYPE;
use crate::utils::universal_newlines;

/// Errors that can happen while retrieving or processing a feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0} does not point to a local file")]
    InvalidFilePath(Url),
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected content type {0:?}")]
    ContentTypeMismatch(Option<String>),
    #[error("the document is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document: {0}")]
    Structure(#[from] ScanError),
}


/// An iCalendar feed (RFC 5545)
///
/// A feed is created empty, then [`fetch`](Feed::fetch)ed from its URL. Its entries are available once it has been processed.
#[derive(Clone, Debug)]
pub struct Feed {
    url: Url,
    content: Option<String>,
    user_agent: String,
    entries: Vec<Entry>,
}

impl Feed {
    /// Create a feed pointing to an URL. This does not fetch anything
    pub fn new<S: AsRef<str>>(url: S) -> Result<Self, FeedError> {
        let url = Url::parse(url.as_ref())?;

        Ok(Self {
            url,
            content: None,
            user_agent: crate::settings::user_agent(),
            entries: Vec::new(),
        })
    }

    /// Create a feed whose content is already known.
    /// [`fetch`](Feed::fetch) will not download it again unless forced, and [`process`](Feed::process) must be called to get the entries.
    pub fn with_content<S: AsRef<str>>(url: S, content: String) -> Result<Self, FeedError> {
        let mut feed = Self::new(url)?;
        feed.content = Some(content);
        Ok(feed)
    }

    /// Use another `User-Agent` than [`crate::settings::USER_AGENT`]
    pub fn with_user_agent<S: ToString>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The raw document, with its original line terminators
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// A short description, e.g. `<Feed url:https://example.com/cal.ics>`
    pub fn summary(&self) -> String {
        format!("<Feed url:{}>", self.url)
    }

    /// Retrieve the document and process it.
    /// Nothing is done if the content is already known, unless `force` is set.
    ///
    /// The content and the entries are only replaced when the new document is well-formed.
    pub async fn fetch(&mut self, force: bool) -> Result<(), FeedError> {
        if self.content.is_none() || force {
            let content = self.retrieve().await?;
            let entries = self.split(&content)?;
            self.content = Some(content);
            self.entries = entries;
        }
        Ok(())
    }

    async fn retrieve(&self) -> Result<String, FeedError> {
        log::debug!("{}: fetching", self.summary());
        let bytes = match self.url.scheme() {
            "http" | "https" => self.retrieve_http().await?,
            "file" => self.retrieve_file().await?,
            other => return Err(FeedError::UnsupportedScheme(other.to_string())),
        };
        Ok(String::from_utf8(bytes)?)
    }

    async fn retrieve_http(&self) -> Result<Vec<u8>, FeedError> {
        let res = reqwest::Client::new()
            .get(self.url.as_str())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let content_type = res.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        check_content_type(content_type)?;

        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn retrieve_file(&self) -> Result<Vec<u8>, FeedError> {
        let path = self.url.to_file_path()
            .map_err(|_| FeedError::InvalidFilePath(self.url.clone()))?;

        check_content_type(guess_content_type(&path))?;

        let bytes = tokio::fs::read(&path).await?;
        Ok(bytes)
    }

    /// Split the current content into entries, replacing the previous ones.
    /// The entry list is left empty if the content is malformed.
    pub fn process(&mut self) -> Result<(), FeedError> {
        let result = match &self.content {
            None => {
                log::warn!("{}: nothing to process", self.summary());
                return Ok(());
            },
            Some(content) => self.split(content),
        };

        match result {
            Ok(entries) => {
                self.entries = entries;
                Ok(())
            },
            Err(err) => {
                self.entries.clear();
                Err(err.into())
            },
        }
    }

    fn split(&self, content: &str) -> Result<Vec<Entry>, ScanError> {
        log::info!("{}: processing {} content characters", self.summary(), content.chars().count());
        scan(content)
    }

    /// Write the raw document, with its original (CRLF) line terminators
    pub fn write<W: Write>(&self, stream: &mut W) -> std::io::Result<()> {
        if let Some(content) = &self.content {
            stream.write_all(content.as_bytes())?;
        }
        Ok(())
    }
}

/// Uses universal newlines. Use [`Feed::write`] to get the CRLF line endings of RFC 5545
impl Display for Feed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.content {
            Some(content) => write!(f, "{}", universal_newlines(content).trim()),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn check_content_type(content_type: Option<String>) -> Result<(), FeedError> {
    if content_type.as_deref() != Some(CALENDAR_CONTENT_TYPE) {
        return Err(FeedError::ContentTypeMismatch(content_type));
    }
    Ok(())
}

/// Local files have no declared content type, it is guessed from their extension
fn guess_content_type(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "ics" | "ifb" | "ical" | "icalendar" => Some(CALENDAR_CONTENT_TYPE.to_string()),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_ICAL: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//Nextcloud Tasks v0.13.6\r\n\
        BEGIN:VTODO\r\n\
        UID:0633de27-8c32-42be-bcb8-63bc879c6185\r\n\
        SUMMARY:Do not forget to do this\r\n\
        END:VTODO\r\n\
        END:VCALENDAR\r\n";

    #[test]
    fn test_empty_feed() {
        let feed = Feed::new("https://my.calend.ar/feed.ics").unwrap();
        assert_eq!(feed.to_string(), "");
        assert_eq!(feed.summary(), "<Feed url:https://my.calend.ar/feed.ics>");
        assert!(feed.entries().is_empty());
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(Feed::new("not an url"), Err(FeedError::Url(_))));
    }

    #[test]
    fn test_process_known_content() {
        let mut feed = Feed::with_content("https://my.calend.ar/feed.ics", EXAMPLE_ICAL.to_string()).unwrap();
        assert!(feed.entries().is_empty());

        feed.process().unwrap();
        let types: Vec<&str> = feed.iter().map(|e| e.entry_type()).collect();
        assert_eq!(types, vec!["VTODO"]);
        assert!(feed.to_string().starts_with("BEGIN:VCALENDAR\nVERSION:2.0\n"));
        assert!(feed.to_string().ends_with("END:VTODO\nEND:VCALENDAR"));
    }

    #[test]
    fn test_write_is_verbatim() {
        let feed = Feed::with_content("https://my.calend.ar/feed.ics", EXAMPLE_ICAL.to_string()).unwrap();
        let mut out = Vec::new();
        feed.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), EXAMPLE_ICAL);
    }

    #[test]
    fn test_malformed_content() {
        let content = "BEGIN:VCALENDAR\r\nBEGIN:VTODO\r\nEND:VEVENT\r\n".to_string();
        let mut feed = Feed::with_content("https://my.calend.ar/feed.ics", content).unwrap();
        assert!(matches!(feed.process(), Err(FeedError::Structure(ScanError::UnmatchedClose { line: 3, .. }))));
        assert!(feed.entries().is_empty());
    }

    #[test]
    fn test_malformed_content_drops_previous_entries() {
        let mut feed = Feed::with_content("https://my.calend.ar/feed.ics", EXAMPLE_ICAL.to_string()).unwrap();
        feed.process().unwrap();
        assert_eq!(feed.entries().len(), 1);

        feed.content = Some(EXAMPLE_ICAL.replace("END:VTODO", "END:VEVENT"));
        assert!(feed.process().is_err());
        assert!(feed.entries().is_empty());
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("/tmp/geohash.ics")).as_deref(), Some("text/calendar"));
        assert_eq!(guess_content_type(Path::new("/tmp/GEOHASH.ICS")).as_deref(), Some("text/calendar"));
        assert_eq!(guess_content_type(Path::new("/tmp/geohash.txt")), None);
        assert_eq!(guess_content_type(Path::new("/tmp/geohash")), None);
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let mut feed = Feed::new("ftp://my.calend.ar/feed.ics").unwrap();
        assert!(matches!(feed.fetch(false).await, Err(FeedError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[tokio::test]
    async fn test_known_content_is_not_fetched_again() {
        // The URL is unreachable, so this would fail if a request was made
        let mut feed = Feed::with_content("http://unreachable.invalid/feed.ics", EXAMPLE_ICAL.to_string()).unwrap();
        feed.fetch(false).await.unwrap();
        assert!(feed.entries().is_empty());
    }
}
