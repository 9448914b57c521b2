// ABOUTME: Core library for hrdesk, containing the conversation model and routing vocabulary.
// ABOUTME: Shared by the store, agent, and server crates; has no I/O of its own.

pub mod employee;
pub mod message;
pub mod route;
pub mod state;

pub use employee::{EmployeeRecord, LeaveBalances};
pub use message::{Message, Role};
pub use route::{ParseRouteError, RouteDecision, WorkerId};
pub use state::ConversationState;
