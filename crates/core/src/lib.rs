pub mod error;
pub mod image;
pub mod page;
pub mod policy;
pub mod record;
pub mod report;
pub mod retention;
pub mod wire;

pub use error::{DomainError, FieldError};
pub use image::{Image, ImageCategory, LegalHold, StorageTier};
pub use page::{Page, PageQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use policy::{RetentionPolicy, MAX_RETENTION_YEARS, MIN_RETENTION_YEARS};
pub use record::{ArchiveAction, ArchiveRecord};
pub use report::{CategoryUsage, ComplianceReport, StorageReport, compliance_report, storage_report};
pub use retention::{
    RetentionState, RetentionStatus, archive_image, ensure_deletable, evaluate, record_access,
    remove_legal_hold, restore_image, set_legal_hold,
};
pub use wire::{WireArch, WireRecord, WireStatus};
