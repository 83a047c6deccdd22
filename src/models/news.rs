//! News model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ResourceRef;
use crate::resource::Resource;

/// A news entry. Available on servers 1.1 and newer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

impl Resource for News {
    const KIND: &'static str = "news";
    // "news" is its own singular in the API's payloads
    const SINGULAR: &'static str = "news";

    fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_deserialize() {
        let json = r#"{
            "id": 54,
            "title": "Redmine 1.0 released",
            "summary": "First stable release",
            "project": {"id": 1, "name": "Redmine"},
            "author": {"id": 1, "name": "Jean-Philippe Lang"},
            "created_on": "2010-07-25T11:52:00Z"
        }"#;
        let news: News = serde_json::from_str(json).unwrap();
        assert_eq!(news.title, "Redmine 1.0 released");
        assert_eq!(news.project.unwrap().id, 1);
    }
}
