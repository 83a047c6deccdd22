//! The `Resource` trait and identity keys.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A key addressing one resource instance within its type.
///
/// Resources are always addressable by numeric id; some types also have
/// a string identifier (e.g. a project slug). Both forms index into the
/// same cache, so a resource fetched under one key is found under the
/// other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Id(u64),
    Name(String),
}

impl CacheKey {
    /// Render the key as a URL path segment.
    #[must_use]
    pub fn segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => urlencoding::encode(name).into_owned(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for CacheKey {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for CacheKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// A remote entity type served by the API.
///
/// Implementations describe where a type lives on the wire (path
/// segment, payload keys) and which identity keys a decoded payload
/// reveals. Fetching, caching, and saving are generic over this trait
/// in [`crate::Collection`].
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Plural name: path segment and the key under which list responses
    /// carry their items, e.g. `"issues"`.
    const KIND: &'static str;

    /// Singular key wrapping single-resource payloads, e.g. `"issue"`.
    const SINGULAR: &'static str;

    /// Path prefix for this type's endpoints. Defaults to [`Self::KIND`];
    /// enumerations override it (`enumerations/time_entry_activities`).
    const PATH: &'static str = Self::KIND;

    /// Numeric id of this instance.
    fn id(&self) -> u64;

    /// String identifier aliasing this instance, if the type has one.
    fn name_key(&self) -> Option<&str> {
        None
    }
}
