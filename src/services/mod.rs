pub mod jira_source;
pub mod pipeline;
pub mod projector;
pub mod row_map;
pub mod sheets_destination;
pub mod store;

pub use jira_source::{Extraction, IssueSource, JiraIssueSource};
pub use pipeline::SyncPipeline;
pub use projector::FieldProjector;
pub use row_map::RowKeyMap;
pub use sheets_destination::{GoogleSheetsDestination, SheetDestination};
pub use store::{PgTaskStore, TaskStore};
