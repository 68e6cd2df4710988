//! Client-side boletas store.
//!
//! Mirrors the backend's "facturadas" and "no-facturadas" lists for every
//! screen that shows them, refreshing in the background and refusing to
//! spin in a refresh loop.

pub mod api;
pub mod boletas_store;
pub mod loop_guard;
pub mod session;

pub use api::{BoletaList, BoletasApi, HttpBoletasApi, StoreError};
pub use boletas_store::{
    BoletasSnapshot, BoletasStore, FetchMode, FetchOutcome, StoreEvent, DEFAULT_LIMIT, POLL_INTERVAL,
};
pub use loop_guard::LoopGuard;
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
