/// Undo/redo history over host-supplied reversible operations.
///
/// Provides a `HistoryManager` that records operations in a capped stack,
/// steps backward and forward through them, groups several operations into
/// one undo step, and reports changes to undo/redo availability.
/// Forward and reverse functions may be synchronous or asynchronous.
pub mod config;
pub mod error;
pub mod manager;
pub mod operation;

pub use config::HistoryConfig;
pub use error::HistoryError;
pub use manager::{ChangeCallback, HistoryManager};
pub use operation::{action, async_action, Action, ActionFuture, GroupId, HistoryState, Operation};
