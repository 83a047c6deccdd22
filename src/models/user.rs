//! User model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A Redmine user account. Available on servers 1.1 and newer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    #[serde(default)]
    pub login: String,

    #[serde(default)]
    pub firstname: String,

    #[serde(default)]
    pub lastname: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_on: Option<DateTime<Utc>>,
}

impl Resource for User {
    const KIND: &'static str = "users";
    const SINGULAR: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}
