//! Services for the kinotek catalog: record CRUD with the conversion state
//! machine, upload orchestration, background completion, and batch repair of
//! status/visibility drift.

pub mod catalog;
pub mod repair;
pub mod upload;
pub mod worker;

pub use catalog::{NewVideoRecord, VideoCatalogService};
pub use repair::{
    CatalogSnapshot, CompletedOnlyPolicy, RecordSnapshot, RepairPolicy, RepairReport,
    RepairService, TerminalVisiblePolicy,
};
pub use upload::{
    UploadError, UploadOutcome, UploadReceipt, UploadRequest, UploadService, UploadedFile,
};
pub use worker::{CompletionHandle, CompletionWorker};
