// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analytics;
pub mod api;
pub mod completion;
pub mod export;
pub mod extractor;
pub mod quality;
pub mod sanitize;
pub mod signal;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::completion::{CompletionClient, DynCompletionClient, MockClient};
pub use crate::signal::{Action, Sentiment, Signal};
pub use crate::store::{MemoryStore, SignalStore};
