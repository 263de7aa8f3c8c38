//! Request audit trail: capture, masking and background persistence.

pub mod capture;
pub mod entry;
pub mod logger;
pub mod mask;
pub mod store;

pub use capture::{DeliveryGuard, OutboundResponse, ResponseCapture, ResponseSink};
pub use entry::{AuditRecord, AuditResult};
pub use logger::{log_transaction, TransactionLogger, UserDirectory};
pub use mask::{SensitiveDataMasker, MASK_MARKER};
pub use store::{AuditSink, AuditStore};
