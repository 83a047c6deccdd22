//! Time entry and time entry activity models.
//!
//! Both arrived with the 2.2 API. Activities are an enumeration: the
//! set of labels (Design, Development, ...) a time entry can be logged
//! under, served from `/enumerations/time_entry_activities.json`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ResourceRef;
use crate::resource::Resource;

/// Hours logged against a project or issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ResourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_on: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Resource for TimeEntry {
    const KIND: &'static str = "time_entries";
    const SINGULAR: &'static str = "time_entry";

    fn id(&self) -> u64 {
        self.id
    }
}

/// An activity label for time entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryActivity {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for TimeEntryActivity {
    const KIND: &'static str = "time_entry_activities";
    const SINGULAR: &'static str = "time_entry_activity";
    const PATH: &'static str = "enumerations/time_entry_activities";

    fn id(&self) -> u64 {
        self.id
    }
}
