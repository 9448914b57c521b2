// ABOUTME: Concrete tools bound to the three workers.
// ABOUTME: Each wraps one data source from hrdesk-store behind the Tool trait.

pub mod fetch_employee;
pub mod policy_search;
pub mod send_email;

pub use fetch_employee::FetchEmployeeDataTool;
pub use policy_search::PolicySearchTool;
pub use send_email::SendEmailTool;
