//! XML backup export and import.

mod document;
mod store;

pub use document::{BackupDocument, BackupProject, BackupSession, ROOT_ELEMENT, VERSION};
pub use store::{collect, restore, BackupSummary};
