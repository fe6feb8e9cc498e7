pub mod jobs;
pub mod settings;

pub use jobs::{ColumnMapping, JobDefinition, ProjectedField, TabRule};
pub use settings::Settings;
