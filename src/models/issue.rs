//! Issue model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Redmine;
use crate::collection::Handle;
use crate::error::Result;
use crate::models::{Project, ResourceRef};
use crate::resource::Resource;

/// A Redmine issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Numeric issue id.
    pub id: u64,

    #[serde(default)]
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning project. Old servers send a bare id, newer ones an
    /// embedded `{"id", "name"}` object; both decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_ratio: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Resource for Issue {
    const KIND: &'static str = "issues";
    const SINGULAR: &'static str = "issue";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Handle<Issue> {
    /// Resolve the owning project through the client's global project
    /// cache. `None` if the payload carried no project reference.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`crate::Collection::get`].
    pub async fn project(&self, redmine: &Redmine) -> Result<Option<Handle<Project>>> {
        let project_id = self.read().project.as_ref().map(|r| r.id);
        match project_id {
            Some(id) => Ok(Some(redmine.projects()?.get(id).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_deserialize_bare_project_id() {
        let json = r#"{
            "id": 1,
            "subject": "Problem with foo",
            "description": "Foo failed to blow up as expected.",
            "project": 1
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, 1);
        assert_eq!(issue.subject, "Problem with foo");
        assert_eq!(issue.project.as_ref().map(|p| p.id), Some(1));
        assert_eq!(issue.project.unwrap().name, None);
    }

    #[test]
    fn test_issue_deserialize_embedded_refs() {
        let json = r#"{
            "id": 4326,
            "subject": "Aggregate Reports",
            "project": {"id": 1, "name": "Redmine"},
            "tracker": {"id": 2, "name": "Feature"},
            "status": {"id": 5, "name": "Closed"},
            "priority": {"id": 4, "name": "Normal"},
            "author": {"id": 10106, "name": "John Smith"},
            "done_ratio": 100,
            "created_on": "2009-10-06T08:07:10Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.project.as_ref().map(|p| p.id), Some(1));
        assert_eq!(
            issue.project.unwrap().name.as_deref(),
            Some("Redmine")
        );
        assert_eq!(issue.status.unwrap().name.as_deref(), Some("Closed"));
        assert_eq!(issue.done_ratio, Some(100));
    }

    #[test]
    fn test_issue_missing_optional_fields() {
        let issue: Issue = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        assert_eq!(issue.subject, "");
        assert!(issue.project.is_none());
        assert!(issue.created_on.is_none());
    }
}
