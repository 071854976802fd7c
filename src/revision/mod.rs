pub mod freezer;
pub mod log;
pub mod navigator;
pub mod record;

pub use freezer::SnapshotFreezer;
pub use navigator::RevisionNavigator;
pub use record::{
    ContentGraph, RevisionEntry, RevisionKind, RevisionQuery, RevisionRecord, SortField, SortOrder,
};
pub use self::log::RevisionLog;
