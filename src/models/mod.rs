//! Redmine API model types.

mod issue;
mod news;
mod project;
mod time_entry;
mod user;

pub use issue::*;
pub use news::*;
pub use project::*;
pub use time_entry::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// A reference to another resource embedded in a payload.
///
/// Servers embed these as `{"id": 1, "name": "..."}`; very old ones
/// send the bare numeric id. Both decode to the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RefRepr")]
pub struct ResourceRef {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefRepr {
    Id(u64),
    Full {
        id: u64,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<RefRepr> for ResourceRef {
    fn from(repr: RefRepr) -> Self {
        match repr {
            RefRepr::Id(id) => Self { id, name: None },
            RefRepr::Full { id, name } => Self { id, name },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_accepts_both_wire_forms() {
        let bare: ResourceRef = serde_json::from_str("1").unwrap();
        assert_eq!(bare.id, 1);
        assert_eq!(bare.name, None);

        let full: ResourceRef =
            serde_json::from_str(r#"{"id": 1, "name": "Test 1"}"#).unwrap();
        assert_eq!(full.id, 1);
        assert_eq!(full.name.as_deref(), Some("Test 1"));
    }
}
