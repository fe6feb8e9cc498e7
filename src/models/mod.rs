pub mod job;
pub mod task;

pub use job::{JobState, JobStatus, SyncReport};
pub use task::{StoredTask, TaskRecord, UNASSIGNED};

/// Célula a escrever numa aba de destino (linha, coluna, valor)
pub type CellUpdate = sheets::Cell;
