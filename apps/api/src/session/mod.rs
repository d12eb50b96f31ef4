//! Editor sessions: the in-memory state of one open document and the store
//! that keeps them between requests.

pub mod controller;
pub mod handlers;
pub mod store;

pub use controller::{
    EditOutcome, EditPayload, EditorSession, SaveTicket, SessionError, SessionSnapshot,
    SessionStatus, ViewMode,
};
pub use store::{SessionHandle, SessionStore, StoreError};
