//! HTTP middleware: sessions and authentication extractors.

pub mod auth;

use tower_sessions::{MemoryStore as SessionMemoryStore, SessionManagerLayer};

/// Create the session layer.
///
/// Sessions live in process memory: there is no relational database in
/// this deployment, and losing sessions on restart only signs customers
/// out.
#[must_use]
pub fn create_session_layer() -> SessionManagerLayer<SessionMemoryStore> {
    let store = SessionMemoryStore::default();
    SessionManagerLayer::new(store).with_secure(false)
}
