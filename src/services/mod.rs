//! Collaborators the consent prompt is wired to at build time: the shared
//! story store, the action service and the host surface.
//!
//! Each one is a trait so the prompt can be driven by a real document or
//! by the in-memory implementations used in tests and by the CLI.

pub mod actions;
pub mod host;
pub mod store;

pub use actions::{ActionInvocation, ActionService, AllowlistEntry, RecordingActions};
pub use host::{BackgroundProvider, StaticBackground};
pub use store::{InMemoryStore, StateProperty, StoreService};
