pub mod api;
pub mod file_source;
pub mod item;

pub use api::{BatchImage, BatchOutcome, GeneratedArtifact, PendingImage};
pub use file_source::{DiskFileSource, FileSource};
pub use item::{ItemId, PageKind, ResultArtifact, Stage, WorkItem, WEEKDAYS};
