//! Redmine API client library.
//!
//! A Rust library for the Redmine REST API that exposes remote
//! resources (projects, issues, users, news, time entries) as locally
//! addressable, lazily fetched objects backed by a per-client identity
//! cache, with the exposed surface gated by the server's version.
//!
//! # Quick Start
//!
//! ```no_run
//! use redmine_api::Redmine;
//!
//! #[tokio::main]
//! async fn main() -> redmine_api::Result<()> {
//!     let redmine = Redmine::with_api_key("https://redmine.example.com", "my-key")?;
//!
//!     // Fetch a project by id or by identifier; both resolve to the
//!     // same cached object.
//!     let project = redmine.projects()?.get(1).await?;
//!     println!("Project: {}", project.read().name);
//!
//!     // Iterate the project's closed issues. Re-running the query
//!     // re-asks the server.
//!     let closed = project.issues(&redmine)?.filter("status_id", "closed");
//!     for issue in closed.fetch().await? {
//!         println!("#{}: {}", issue.read().id, issue.read().subject);
//!     }
//!
//!     // Mutate locally, then push.
//!     project.update(|p| p.name = "Renamed".to_string());
//!     project.save().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Redmine`] — root client; built against a server version, it
//!   exposes one [`Collection`] per resource type the version supports
//!   (see [`Capabilities`]).
//! - [`Collection`] — per-type cache-and-fetch façade. Lookups memoize
//!   by identity key, so a resource reached by numeric id, by string
//!   identifier, or through a relation is one shared object.
//! - [`Handle`] — a shared reference to a cached resource: field reads,
//!   local mutation, `save()`, and relationship traversal.
//! - [`Query`] — a restartable filtered listing; each `fetch()`
//!   re-issues the remote query and merges results into the cache.
//!
//! # Version gating
//!
//! Redmine servers grew the API over several releases. The client
//! consults a static capability matrix at construction: a 1.0 client
//! only has `projects()` and `issues()`; users and news arrive at 1.1,
//! project memberships at 1.4, and time entries, activity enumerations,
//! and wiki pages at 2.2. Omitting the version assumes a current
//! server.

mod client;
mod collection;
mod error;
mod models;
mod resource;
mod transport;
mod version;

// Re-export core types
pub use client::Redmine;
pub use collection::{Collection, Handle, Query};
pub use error::{RedmineError, Result};
pub use resource::{CacheKey, Resource};
pub use transport::Transport;
pub use version::{ApiVersion, Capabilities, ResourceKind};

// Re-export models
pub use models::{Issue, News, Project, ResourceRef, TimeEntry, TimeEntryActivity, User};
