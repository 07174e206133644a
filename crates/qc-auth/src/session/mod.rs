//! Authenticated-session lifecycle.
//!
//! [`Session`] is a plain value with pure transitions; [`SessionStore`]
//! sequences them around storage and identity calls, publishes each result
//! on a watch channel and notifies observers.

mod state;
mod store;

pub use state::{AuthOutcome, Session, SessionPhase};
pub use store::{REFRESH_BUFFER_SECS, SessionStore};

/// Synchronous hook invoked after every published transition.
pub trait SessionObserver: Send + Sync + 'static {
    fn on_transition(&self, session: &Session);
}
