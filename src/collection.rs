//! Per-resource-type collections: the cache-and-fetch façade.
//!
//! A [`Collection`] resolves individual or filtered sets of resources,
//! memoizing by identity key so that repeated lookups through different
//! access paths (numeric id, string identifier, nested relation) yield
//! the *same* in-memory object. All views of one resource type inside a
//! client share one cache, including collections scoped under a parent
//! (`/projects/1/issues.json`), so an issue reached through its project
//! is the identical object to one fetched at top level.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use serde::de::Error as _;
use serde_json::Value;

use crate::error::{RedmineError, Result};
use crate::resource::{CacheKey, Resource};
use crate::transport::Transport;

/// Default page size for list requests.
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages to fetch per query (safety limit).
const MAX_PAGES: u32 = 1000;

type Entry<T> = Arc<RwLock<T>>;
type Cache<T> = Arc<RwLock<HashMap<CacheKey, Entry<T>>>>;

/// The cache-and-fetch façade for one resource type.
///
/// Cheaply cloneable; clones (and scoped views) share the same identity
/// cache and connection pool.
pub struct Collection<T: Resource> {
    transport: Transport,
    cache: Cache<T>,
    /// Path prefix for list requests when this view is scoped under a
    /// parent resource, e.g. `projects/1`.
    prefix: Option<String>,
}

impl<T: Resource> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            cache: Arc::clone(&self.cache),
            prefix: self.prefix.clone(),
        }
    }
}

impl<T: Resource> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &T::KIND)
            .field("prefix", &self.prefix)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl<T: Resource> Collection<T> {
    pub(crate) fn new(transport: Transport) -> Self {
        Self {
            transport,
            cache: Arc::new(RwLock::new(HashMap::new())),
            prefix: None,
        }
    }

    /// A view of this collection whose list requests are nested under a
    /// parent path. Shares this collection's cache.
    pub(crate) fn scoped(&self, prefix: impl Into<String>) -> Self {
        Self {
            transport: self.transport.clone(),
            cache: Arc::clone(&self.cache),
            prefix: Some(prefix.into()),
        }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch a single resource by id or string identifier.
    ///
    /// Returns the cached handle if the key (or any alias of it learned
    /// from an earlier fetch) is already known; otherwise issues one GET
    /// for the singular resource path and caches the result under every
    /// identity key the payload reveals.
    ///
    /// # Errors
    ///
    /// [`RedmineError::NotFound`] when the server has no such resource,
    /// [`RedmineError::Transport`]/[`RedmineError::Api`] on HTTP failure,
    /// [`RedmineError::Decode`] on an unexpected payload shape.
    pub async fn get(&self, key: impl Into<CacheKey>) -> Result<Handle<T>> {
        let key = key.into();
        let cached = self.cache.read().get(&key).cloned();
        if let Some(entry) = cached {
            tracing::debug!(kind = T::KIND, key = %key, "identity cache hit");
            return Ok(self.handle(entry));
        }
        self.fetch(&key).await
    }

    /// Fetch the singular resource path, bypassing the cache lookup.
    /// The result still registers into (and merges with) the cache.
    pub(crate) async fn fetch(&self, key: &CacheKey) -> Result<Handle<T>> {
        let path = format!("{}/{}.json", T::PATH, key.segment());
        let body = match self.transport.get_json(&path).await {
            Ok(body) => body,
            Err(RedmineError::Api {
                status_code: Some(404),
                ..
            }) => {
                return Err(RedmineError::NotFound {
                    resource: T::KIND,
                    key: key.to_string(),
                })
            }
            Err(err) => return Err(err),
        };
        self.register(unwrap_single::<T>(body)?)
    }

    /// Start building a filtered, restartable query over this collection.
    pub fn query(&self) -> Query<T> {
        Query {
            collection: self.clone(),
            filters: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Fetch all resources in this collection (no filters).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list(&self) -> Result<Vec<Handle<T>>> {
        self.query().fetch().await
    }

    /// Register a decoded single-resource payload into the cache.
    ///
    /// If any identity key of the payload is already cached, the cached
    /// object's fields are overwritten in place, so handles held from
    /// earlier lookups observe the refreshed values; otherwise a new
    /// entry is created. Either way the entry ends up indexed under
    /// every alias the payload reveals.
    pub(crate) fn register(&self, value: Value) -> Result<Handle<T>> {
        let decoded: T = serde_json::from_value(value).map_err(RedmineError::Decode)?;

        let mut keys = vec![CacheKey::Id(decoded.id())];
        if let Some(name) = decoded.name_key() {
            keys.push(CacheKey::Name(name.to_string()));
        }

        let mut cache = self.cache.write();
        let existing = keys.iter().find_map(|k| cache.get(k).cloned());
        let entry = match existing {
            Some(entry) => {
                *entry.write() = decoded;
                entry
            }
            None => Arc::new(RwLock::new(decoded)),
        };
        for key in keys {
            cache.insert(key, Arc::clone(&entry));
        }
        drop(cache);

        Ok(self.handle(entry))
    }

    fn handle(&self, entry: Entry<T>) -> Handle<T> {
        Handle {
            entry,
            collection: self.clone(),
        }
    }

    fn list_path(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{}.json", T::KIND),
            None => format!("{}.json", T::PATH),
        }
    }
}

/// A filtered query over a collection.
///
/// Lazy and restartable: nothing is requested until [`Query::fetch`],
/// and every `fetch` call re-issues the remote query, so results
/// reflect server state at fetch time. Elements resolve through the
/// collection's identity cache, so entities seen before come back as
/// the same shared objects with refreshed fields.
#[derive(Clone)]
pub struct Query<T: Resource> {
    collection: Collection<T>,
    filters: Vec<(String, String)>,
    page_size: u32,
}

impl<T: Resource> Query<T> {
    /// Add a server-side filter, e.g. `.filter("status_id", "closed")`.
    ///
    /// `limit` and `offset` are pagination controls owned by the fetch
    /// loop; attempts to set them as filters are ignored.
    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        if name == "limit" || name == "offset" {
            tracing::warn!(filter = %name, "pagination parameters are managed internally, ignoring");
            return self;
        }
        self.filters.push((name, value.to_string()));
        self
    }

    /// Execute the query, fetching every page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or an item does not
    /// decode.
    #[tracing::instrument(skip(self), fields(kind = T::KIND))]
    pub async fn fetch(&self) -> Result<Vec<Handle<T>>> {
        let mut handles = Vec::new();
        let mut offset: u64 = 0;
        let mut pages = 0u32;

        loop {
            let page = self.fetch_page(offset, self.page_size).await?;
            let count = page.items.len();
            for item in page.items {
                handles.push(self.collection.register(item)?);
            }
            offset += count as u64;
            pages += 1;

            let exhausted = count < self.page_size as usize
                || page.total_count.is_some_and(|total| offset >= total);
            if exhausted {
                break;
            }
            if pages >= MAX_PAGES {
                tracing::warn!("reached pagination limit of {MAX_PAGES} pages, stopping");
                break;
            }
        }

        Ok(handles)
    }

    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<ListPage> {
        let mut params: Vec<(&str, String)> = self
            .filters
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));

        let body = self
            .collection
            .transport
            .get_json_with_query(&self.collection.list_path(), &params)
            .await?;
        split_list::<T>(body)
    }
}

struct ListPage {
    items: Vec<Value>,
    total_count: Option<u64>,
}

/// Unwrap a single-resource payload.
///
/// Servers wrap single resources in their singular key
/// (`{"project": {...}}`); older ones return the bare object. Accept
/// both.
fn unwrap_single<T: Resource>(value: Value) -> Result<Value> {
    match value {
        Value::Object(mut map) => {
            if map.get(T::SINGULAR).is_some_and(Value::is_object) {
                return Ok(map.remove(T::SINGULAR).unwrap_or_default());
            }
            Ok(Value::Object(map))
        }
        other => Err(RedmineError::Decode(serde_json::Error::custom(format!(
            "expected a JSON object for {}, got {other}",
            T::SINGULAR
        )))),
    }
}

/// Split a collection payload into its items and pagination counters.
///
/// The items live under the plural key (`{"issues": [...]}`);
/// `total_count` is present on paginated servers and absent on old ones.
fn split_list<T: Resource>(value: Value) -> Result<ListPage> {
    let total_count = value.get("total_count").and_then(Value::as_u64);
    match value {
        Value::Object(mut map) => match map.remove(T::KIND) {
            Some(Value::Array(items)) => Ok(ListPage { items, total_count }),
            _ => Err(RedmineError::Decode(serde_json::Error::custom(format!(
                "list response missing '{}' array",
                T::KIND
            )))),
        },
        other => Err(RedmineError::Decode(serde_json::Error::custom(format!(
            "expected a JSON object listing {}, got {other}",
            T::KIND
        )))),
    }
}

/// A shared reference to one cached resource object.
///
/// All handles for the same entity point at the same storage: a refresh
/// through any access path is visible through every handle. Field reads
/// go through [`Handle::read`]; local mutations through
/// [`Handle::update`] touch nothing remote until [`Handle::save`].
pub struct Handle<T: Resource> {
    entry: Entry<T>,
    collection: Collection<T>,
}

impl<T: Resource> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
            collection: self.collection.clone(),
        }
    }
}

impl<T: Resource> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &T::KIND)
            .field("id", &self.entry.read().id())
            .finish()
    }
}

impl<T: Resource> Handle<T> {
    /// Read access to the current field values.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.entry.read()
    }

    /// Mutate fields locally. Nothing is sent to the server until
    /// [`Handle::save`].
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.entry.write());
    }

    /// Whether two handles refer to the identical cached object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }

    /// Push the current field set to the server.
    ///
    /// Serializes the full field set wrapped in the singular key and
    /// PUTs it to the resource's path. The cache entry already holds the
    /// just-written values, so nothing is invalidated on success.
    ///
    /// # Errors
    ///
    /// [`RedmineError::Validation`] when the server rejects the write,
    /// [`RedmineError::Transport`]/[`RedmineError::Api`] on HTTP failure.
    pub async fn save(&self) -> Result<()> {
        let (id, body) = {
            let guard = self.entry.read();
            let fields = serde_json::to_value(&*guard).map_err(RedmineError::Decode)?;
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(T::SINGULAR.to_string(), fields);
            (guard.id(), Value::Object(wrapper))
        };
        let path = format!("{}/{}.json", T::PATH, id);
        self.collection.transport.put(&path, &body).await
    }

    /// Re-fetch this resource from the server, refreshing the shared
    /// cache entry in place. Discards uncommitted local mutations.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Collection::get`].
    pub async fn reload(&self) -> Result<()> {
        let id = self.entry.read().id();
        self.collection.fetch(&CacheKey::Id(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, Project};

    fn collection<T: Resource>() -> Collection<T> {
        let transport = Transport::new("http://redmine.test", None, true).unwrap();
        Collection::new(transport)
    }

    #[test]
    fn test_register_indexes_all_aliases() {
        let projects = collection::<Project>();
        let handle = projects
            .register(serde_json::json!({
                "id": 1,
                "name": "Test 1",
                "identifier": "test_1"
            }))
            .unwrap();

        let by_id = projects.cache.read().get(&CacheKey::Id(1)).cloned();
        let by_name = projects
            .cache
            .read()
            .get(&CacheKey::from("test_1"))
            .cloned();
        assert!(by_id.is_some());
        assert!(by_name.is_some());
        assert!(Arc::ptr_eq(&by_id.unwrap(), &by_name.unwrap()));
        assert_eq!(handle.read().name, "Test 1");
    }

    #[test]
    fn test_register_merges_in_place() {
        let issues = collection::<Issue>();
        let first = issues
            .register(serde_json::json!({
                "id": 1,
                "subject": "Problem with foo",
                "description": "Foo failed to blow up as expected.",
                "project": 1
            }))
            .unwrap();
        let second = issues
            .register(serde_json::json!({
                "id": 1,
                "subject": "Updated",
                "description": "Foo failed to blow up.  Updated.",
                "project": 1
            }))
            .unwrap();

        assert!(first.ptr_eq(&second));
        // The handle held from before the refresh sees the new fields.
        assert_eq!(first.read().subject, "Updated");
    }

    #[test]
    fn test_register_rejects_bad_payload() {
        let projects = collection::<Project>();
        let err = projects
            .register(serde_json::json!({"name": "no id"}))
            .unwrap_err();
        assert!(matches!(err, RedmineError::Decode(_)));
    }

    #[test]
    fn test_unwrap_single_accepts_bare_and_wrapped() {
        let bare = serde_json::json!({"id": 1, "name": "Test 1"});
        assert_eq!(unwrap_single::<Project>(bare.clone()).unwrap(), bare);

        let wrapped = serde_json::json!({"project": {"id": 1, "name": "Test 1"}});
        assert_eq!(unwrap_single::<Project>(wrapped).unwrap(), bare);

        assert!(unwrap_single::<Project>(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_split_list_shapes() {
        let plain = serde_json::json!({"issues": [{"id": 1}]});
        let page = split_list::<Issue>(plain).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, None);

        let paginated = serde_json::json!({
            "issues": [{"id": 1}],
            "total_count": 41,
            "offset": 0,
            "limit": 25
        });
        let page = split_list::<Issue>(paginated).unwrap();
        assert_eq!(page.total_count, Some(41));

        assert!(split_list::<Issue>(serde_json::json!({"projects": []})).is_err());
    }

    #[test]
    fn test_query_ignores_reserved_pagination_filters() {
        let issues = collection::<Issue>();
        let query = issues
            .query()
            .filter("status_id", "closed")
            .filter("limit", 5)
            .filter("offset", 10);
        assert_eq!(query.filters, vec![("status_id".to_string(), "closed".to_string())]);
    }

    #[test]
    fn test_scoped_view_shares_cache() {
        let issues = collection::<Issue>();
        let scoped = issues.scoped("projects/1");
        scoped
            .register(serde_json::json!({"id": 7, "subject": "nested"}))
            .unwrap();
        let top = issues.cache.read().get(&CacheKey::Id(7)).cloned();
        assert!(top.is_some());
        assert_eq!(scoped.list_path(), "projects/1/issues.json");
        assert_eq!(issues.list_path(), "issues.json");
    }
}
