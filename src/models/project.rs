//! Project model and relationship traversal.
//!
//! Projects are the top-level containers in Redmine; issues, time
//! entries, memberships, and wiki pages all hang off a project. A
//! project is addressable both by numeric id and by its string
//! identifier (slug), and the identity cache indexes it under both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Redmine;
use crate::collection::{Handle, Query};
use crate::error::{RedmineError, Result};
use crate::models::Issue;
use crate::resource::Resource;

/// A Redmine project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project id.
    pub id: u64,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// URL slug, e.g. `test_1`. Aliases the numeric id in lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Resource for Project {
    const KIND: &'static str = "projects";
    const SINGULAR: &'static str = "project";

    fn id(&self) -> u64 {
        self.id
    }

    fn name_key(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl Handle<Project> {
    /// Issues belonging to this project.
    ///
    /// The query lists from `/projects/<id>/issues.json` but resolves
    /// every element through the client's global issue cache, so an
    /// issue reached here is the identical object to one fetched via
    /// `redmine.issues()`.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] if issues are disabled
    /// for the configured server version.
    pub fn issues(&self, redmine: &Redmine) -> Result<Query<Issue>> {
        let scope = format!("projects/{}", self.read().id);
        Ok(redmine.issues()?.scoped(scope).query())
    }

    /// A single issue in this project, resolved through the client's
    /// global issue cache.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`crate::Collection::get`].
    pub async fn issue(&self, redmine: &Redmine, id: u64) -> Result<Handle<Issue>> {
        redmine.issues()?.get(id).await
    }

    /// Membership listing for this project. Requires server 1.4+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] when the configured
    /// version predates project memberships.
    pub async fn memberships(&self, redmine: &Redmine) -> Result<Vec<serde_json::Value>> {
        if !redmine.capabilities().has_project_memberships {
            return Err(RedmineError::Unsupported {
                resource: "memberships",
                configured: redmine.version_label(),
            });
        }
        let path = format!("projects/{}/memberships.json", self.read().id);
        let body = redmine.transport().get_json(&path).await?;
        extract_array(body, "memberships")
    }

    /// Wiki page index for this project. Requires server 2.2+.
    ///
    /// # Errors
    ///
    /// Fails with [`RedmineError::Unsupported`] when the configured
    /// version predates wiki pages.
    pub async fn wiki_pages(&self, redmine: &Redmine) -> Result<Vec<serde_json::Value>> {
        if !redmine.capabilities().has_wiki_pages {
            return Err(RedmineError::Unsupported {
                resource: "wiki_pages",
                configured: redmine.version_label(),
            });
        }
        let path = format!("projects/{}/wiki/index.json", self.read().id);
        let body = redmine.transport().get_json(&path).await?;
        extract_array(body, "wiki_pages")
    }
}

fn extract_array(body: serde_json::Value, key: &str) -> Result<Vec<serde_json::Value>> {
    use serde::de::Error as _;
    match body.get(key).and_then(serde_json::Value::as_array) {
        Some(items) => Ok(items.clone()),
        None => Err(RedmineError::Decode(serde_json::Error::custom(format!(
            "response missing '{key}' array"
        )))),
    }
}
