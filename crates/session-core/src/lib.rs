pub mod events;
pub mod session;

pub use events::SessionEvent;
pub use session::{SessionError, SessionHandle, SessionParams, run_session, spawn_session};
