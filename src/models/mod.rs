pub mod invoice;
pub mod notice;
pub mod result;

pub use invoice::{Invoice, InvoiceRow, MoveType, PaymentState, PostingState};
pub use notice::{
    AuditNote, MailTemplate, OutgoingMail, PendingNotice, Sender, SourceRef,
    DEFAULT_SUBJECT_PREFIX, DEFAULT_TEMPLATE_NAME,
};
pub use result::{BulkOutcome, BulkStatus, Notification, Severity};
