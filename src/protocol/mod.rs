pub mod error_codes;
pub mod messages;
pub mod types;

pub use error_codes::ErrorCode;
pub use messages::{EventKind, EventMessage};
pub use types::{ConnectionId, LivenessState, UserId};
