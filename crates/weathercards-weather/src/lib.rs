//! City weather data for Weathercards
//!
//! Loads the city/weather dataset from a hosted JSON store (falling back to
//! built-in data), searches it by name, and keeps edits in sync with the
//! remote. Also holds the debouncer and theme preference used by front-ends.

pub mod debounce;
pub mod fallback;
pub mod remote;
pub mod search;
pub mod store;
pub mod theme;
pub mod types;

pub use debounce::Debouncer;
pub use fallback::fallback_dataset;
pub use remote::RemoteStore;
pub use search::SUGGESTION_LIMIT;
pub use store::{DataStore, SyncEvent, SyncOp, SyncPolicy};
pub use theme::{Theme, ThemeError, ThemeStore};
pub use types::*;
