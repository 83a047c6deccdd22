//! Redmine root client.
//!
//! Construction consults the version capability matrix once and builds
//! one [`Collection`] per resource type the server version supports.
//! Accessors for unsupported types fail with
//! [`RedmineError::Unsupported`] instead of reaching the network.

use std::env;

use crate::collection::Collection;
use crate::error::{RedmineError, Result};
use crate::models::{Issue, News, Project, TimeEntry, TimeEntryActivity, User};
use crate::resource::Resource;
use crate::transport::Transport;
use crate::version::{ApiVersion, Capabilities, ResourceKind};

/// Root client for a Redmine server.
///
/// Each client owns its own identity caches; independently constructed
/// clients share nothing. A client is intended for use from a single
/// logical thread of control: accesses block until the underlying
/// request completes, one request per access.
///
/// # Example
///
/// ```no_run
/// use redmine_api::Redmine;
///
/// # async fn example() -> redmine_api::Result<()> {
/// let redmine = Redmine::with_api_key("https://redmine.example.com", "my-key")?;
/// let project = redmine.projects()?.get("test_1").await?;
/// println!("{}", project.read().name);
/// # Ok(())
/// # }
/// ```
pub struct Redmine {
    transport: Transport,
    version: Option<ApiVersion>,
    capabilities: Capabilities,
    projects: Option<Collection<Project>>,
    issues: Option<Collection<Issue>>,
    users: Option<Collection<User>>,
    news: Option<Collection<News>>,
    time_entries: Option<Collection<TimeEntry>>,
    time_entry_activities: Option<Collection<TimeEntryActivity>>,
}

impl std::fmt::Debug for Redmine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redmine")
            .field("base_url", &self.transport.base_url().as_str())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Redmine {
    /// Create a client for a server of unknown version.
    ///
    /// An unknown version is treated as a current one: every resource
    /// type and capability is exposed.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::configure(base_url, None, None)
    }

    /// Create a client pinned to a known server version.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_version(base_url: &str, version: ApiVersion) -> Result<Self> {
        Self::configure(base_url, None, Some(version))
    }

    /// Create an authenticated client for a server of unknown version.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_api_key(base_url: &str, api_key: &str) -> Result<Self> {
        Self::configure(base_url, Some(api_key), None)
    }

    /// Create a client from environment variables.
    ///
    /// Uses `REDMINE_URL` for the base URL, and optionally
    /// `REDMINE_API_KEY` and `REDMINE_VERSION` (e.g. `"2.2"`).
    ///
    /// # Errors
    ///
    /// Returns an error if `REDMINE_URL` is not set or `REDMINE_VERSION`
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("REDMINE_URL").map_err(|_| {
            RedmineError::ConfigMissing("REDMINE_URL environment variable not set".to_string())
        })?;
        let api_key = env::var("REDMINE_API_KEY").ok();
        let version = match env::var("REDMINE_VERSION") {
            Ok(raw) => Some(raw.parse().map_err(RedmineError::ConfigMissing)?),
            Err(_) => None,
        };
        Self::configure(&base_url, api_key.as_deref(), version)
    }

    /// Create a fully configured client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn configure(
        base_url: &str,
        api_key: Option<&str>,
        version: Option<ApiVersion>,
    ) -> Result<Self> {
        let capabilities = Capabilities::for_version(version);
        let transport = Transport::new(base_url, api_key, capabilities.key_in_header)?;

        fn enabled<T: Resource>(
            capabilities: &Capabilities,
            kind: ResourceKind,
            transport: &Transport,
        ) -> Option<Collection<T>> {
            capabilities
                .supports(kind)
                .then(|| Collection::new(transport.clone()))
        }

        tracing::debug!(base_url, ?version, "constructing client");

        Ok(Self {
            projects: enabled(&capabilities, ResourceKind::Projects, &transport),
            issues: enabled(&capabilities, ResourceKind::Issues, &transport),
            users: enabled(&capabilities, ResourceKind::Users, &transport),
            news: enabled(&capabilities, ResourceKind::News, &transport),
            time_entries: enabled(&capabilities, ResourceKind::TimeEntries, &transport),
            time_entry_activities: enabled(
                &capabilities,
                ResourceKind::TimeEntryActivities,
                &transport,
            ),
            transport,
            version,
            capabilities,
        })
    }

    /// The configured server version, if one was given.
    pub fn version(&self) -> Option<ApiVersion> {
        self.version
    }

    /// What this client may do against its server.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Project collection.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] when projects are not
    /// available for the configured version.
    pub fn projects(&self) -> Result<&Collection<Project>> {
        self.projects
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::Projects))
    }

    /// Issue collection.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] when issues are not
    /// available for the configured version.
    pub fn issues(&self) -> Result<&Collection<Issue>> {
        self.issues
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::Issues))
    }

    /// User collection. Requires server 1.1+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] on older versions.
    pub fn users(&self) -> Result<&Collection<User>> {
        self.users
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::Users))
    }

    /// News collection. Requires server 1.1+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] on older versions.
    pub fn news(&self) -> Result<&Collection<News>> {
        self.news
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::News))
    }

    /// Time entry collection. Requires server 2.2+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] on older versions.
    pub fn time_entries(&self) -> Result<&Collection<TimeEntry>> {
        self.time_entries
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::TimeEntries))
    }

    /// Time entry activity enumeration. Requires server 2.2+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] on older versions.
    pub fn time_entry_activities(&self) -> Result<&Collection<TimeEntryActivity>> {
        self.time_entry_activities
            .as_ref()
            .ok_or_else(|| self.unsupported(ResourceKind::TimeEntryActivities))
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    pub(crate) fn version_label(&self) -> String {
        match self.version {
            Some(v) => v.to_string(),
            None => "unknown".to_string(),
        }
    }

    fn unsupported(&self, kind: ResourceKind) -> RedmineError {
        RedmineError::Unsupported {
            resource: kind.as_str(),
            configured: self.version_label(),
        }
    }
}
