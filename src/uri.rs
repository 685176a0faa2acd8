//! Content URI - addressable identity for the collection and single items
//!
//! Format: `content://<authority>/<path>`
//!
//! Examples:
//! - `content://me.theofrancisco.android.bookstore/books`
//! - `content://me.theofrancisco.android.bookstore/books/7`

use crate::contract::{CONTENT_AUTHORITY, PATH_BOOKS, SCHEME};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static BOOKS_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `books` or `books/<digits>`
fn books_pattern() -> &'static Regex {
    BOOKS_PATTERN.get_or_init(|| {
        Regex::new(&format!(r"^{}(?:/(\d+))?$", regex::escape(PATH_BOOKS)))
            .expect("static pattern is valid")
    })
}

/// What a content URI addresses once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Every item in the table
    Collection,
    /// One item by row id
    Item(i64),
}

/// A parsed content URI.
///
/// Only the scheme is checked at parse time. Whether the URI names
/// something this store serves is decided by [`ContentUri::resource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    /// Provider authority
    pub authority: String,
    /// Path below the authority, without leading or trailing slashes
    pub path: String,
}

impl ContentUri {
    /// Create a new ContentUri
    pub fn new(authority: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            authority: authority.into(),
            path: path.trim_matches('/').to_string(),
        }
    }

    /// The books collection under `authority`
    pub fn collection(authority: impl Into<String>) -> Self {
        Self::new(authority, PATH_BOOKS)
    }

    /// The item `id` under the default authority
    pub fn item(id: i64) -> Self {
        Self::collection(CONTENT_AUTHORITY).with_appended_id(id)
    }

    /// Parse a URI string into a ContentUri
    ///
    /// Expected format: `content://<authority>[/<path>]`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| Error::UnknownUri(format!("{} (URI must start with content://)", uri)))?;

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if authority.is_empty() {
            return Err(Error::UnknownUri(format!("{} (missing authority)", uri)));
        }

        Ok(Self::new(authority, path))
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        if self.path.is_empty() {
            format!("{}://{}", SCHEME, self.authority)
        } else {
            format!("{}://{}/{}", SCHEME, self.authority, self.path)
        }
    }

    /// Append a row id as a new final path segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        if self.path.is_empty() {
            Self::new(self.authority.clone(), id.to_string())
        } else {
            Self::new(self.authority.clone(), format!("{}/{}", self.path, id))
        }
    }

    /// Numeric final path segment, if any
    pub fn parse_id(&self) -> Option<i64> {
        self.path.rsplit('/').next()?.parse().ok()
    }

    /// True when `other` lives strictly below this URI
    pub fn is_ancestor_of(&self, other: &ContentUri) -> bool {
        self.authority == other.authority
            && other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && (self.path.is_empty() || other.path.as_bytes()[self.path.len()] == b'/')
    }

    /// Resolve against the patterns served under `authority`.
    pub fn resolve(&self, authority: &str) -> Result<Resource> {
        if self.authority != authority {
            return Err(Error::UnknownUri(self.to_uri_string()));
        }

        let captures = books_pattern()
            .captures(&self.path)
            .ok_or_else(|| Error::UnknownUri(self.to_uri_string()))?;

        match captures.get(1) {
            None => Ok(Resource::Collection),
            Some(id) => id
                .as_str()
                .parse::<i64>()
                .map(Resource::Item)
                .map_err(|_| Error::UnknownUri(self.to_uri_string())),
        }
    }

    /// Resolve against the default authority
    pub fn resource(&self) -> Result<Resource> {
        self.resolve(CONTENT_AUTHORITY)
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ContentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}
