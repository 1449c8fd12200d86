//! Board domain: document model, state container and persistence.
//!
//! Everything here is independent of Leptos; the components only render
//! [`store::BoardStore`] snapshots and send [`store::BoardIntent`]s back.

pub mod catalog;
pub mod connect;
pub mod drag;
pub mod export;
pub mod http;
pub mod model;
pub mod permission;
pub mod store;
pub mod style;
pub mod sync;

pub use model::{Board, BoardData, CaseId, Edge, Node, Position, Relationship, Viewport};
pub use permission::{Access, Actor};
pub use store::{BoardIntent, BoardStore, Outcome, Rejection, SyncStatus};
pub use sync::{Autosave, BoardBackend, StoreCell, Synchronizer};
