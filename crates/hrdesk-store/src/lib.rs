// ABOUTME: Data sources behind the hrdesk workers' tools.
// ABOUTME: Provides the employee directory, the leave-policy passage index, and email transports.

pub mod directory;
pub mod mailer;
pub mod policy_index;

pub use directory::{DirectoryError, EmployeeDirectory};
pub use mailer::{Delivery, EmailTransport, LogTransport, MailError, OutgoingEmail, RecordingTransport};
pub use policy_index::{DEFAULT_TOP_K, PolicyIndex, PolicyIndexError};
