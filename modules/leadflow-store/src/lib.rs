//! Postgres data access for the lead-pipeline workflow.
//!
//! Thin store types over `sqlx::PgPool`. Each write is its own auto-committed
//! statement; there is no locking on lead or session rows and no transaction
//! spanning the stage-update + tag-add pair. Concurrent activity writes for
//! the same lead may land in either order — an accepted race, not a bug the
//! stores try to hide.

pub mod activity;
pub mod companies;
pub mod leads;
pub mod schema;
pub mod sessions;
pub mod tags;

pub use activity::ActivityLog;
pub use companies::CompanyStore;
pub use leads::LeadStore;
pub use sessions::SessionStore;
pub use tags::{TagAdd, TagStore};
