/// Core types for recorded operations, entries and change snapshots.
use std::fmt;
use std::future::Future;

use anyhow::Result;
use futures::future::{self, BoxFuture, FutureExt};

/// Future returned by an [`Action`]. Resolves once the side effect is done.
pub type ActionFuture = BoxFuture<'static, Result<()>>;

/// A zero-argument forward or reverse function supplied by the host.
///
/// Synchronous closures are wrapped with [`action`], asynchronous ones
/// with [`async_action`].
pub type Action = Box<dyn FnMut() -> ActionFuture + Send>;

/// Wraps a synchronous closure as an [`Action`] that completes immediately.
pub fn action<F>(mut f: F) -> Action
where
    F: FnMut() -> Result<()> + Send + 'static,
{
    Box::new(move || future::ready(f()).boxed())
}

/// Wraps a closure returning a future as an [`Action`].
pub fn async_action<F, Fut>(mut f: F) -> Action
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(move || f().boxed())
}

/// Identifier shared by every entry added while a group is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

/// Undo/redo availability passed to the change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// An operation handed to [`HistoryManager::add`](crate::HistoryManager::add).
///
/// `Record` only becomes redoable when added. `Execute` runs its forward
/// function right away and reuses it for later redos.
pub enum Operation {
    Record { redo: Action, undo: Action },
    Execute { execute: Action, undo: Action },
}

impl Operation {
    /// Record-style operation from synchronous closures.
    pub fn record<R, U>(redo: R, undo: U) -> Self
    where
        R: FnMut() -> Result<()> + Send + 'static,
        U: FnMut() -> Result<()> + Send + 'static,
    {
        Self::Record {
            redo: action(redo),
            undo: action(undo),
        }
    }

    /// Execute-style operation from synchronous closures.
    pub fn execute<E, U>(execute: E, undo: U) -> Self
    where
        E: FnMut() -> Result<()> + Send + 'static,
        U: FnMut() -> Result<()> + Send + 'static,
    {
        Self::Execute {
            execute: action(execute),
            undo: action(undo),
        }
    }

    /// Record-style operation from asynchronous closures.
    pub fn record_async<R, RFut, U, UFut>(redo: R, undo: U) -> Self
    where
        R: FnMut() -> RFut + Send + 'static,
        RFut: Future<Output = Result<()>> + Send + 'static,
        U: FnMut() -> UFut + Send + 'static,
        UFut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::Record {
            redo: async_action(redo),
            undo: async_action(undo),
        }
    }

    /// Execute-style operation from asynchronous closures.
    pub fn execute_async<E, EFut, U, UFut>(execute: E, undo: U) -> Self
    where
        E: FnMut() -> EFut + Send + 'static,
        EFut: Future<Output = Result<()>> + Send + 'static,
        U: FnMut() -> UFut + Send + 'static,
        UFut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::Execute {
            execute: async_action(execute),
            undo: async_action(undo),
        }
    }

    /// Whether adding this operation runs its forward function immediately.
    pub fn executes_on_add(&self) -> bool {
        matches!(self, Self::Execute { .. })
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record { .. } => f.write_str("Operation::Record"),
            Self::Execute { .. } => f.write_str("Operation::Execute"),
        }
    }
}

/// A recorded entry. Identity is its position in the history stack.
pub(crate) struct Entry {
    pub(crate) redo: Action,
    pub(crate) undo: Action,
    pub(crate) group: Option<GroupId>,
}

impl Entry {
    /// Resolves an operation into a stored entry.
    ///
    /// Returns the entry plus, for execute-style operations, a flag telling
    /// the caller to run the forward function once bookkeeping is done.
    pub(crate) fn from_operation(op: Operation, group: Option<GroupId>) -> (Self, bool) {
        match op {
            Operation::Record { redo, undo } => (Self { redo, undo, group }, false),
            Operation::Execute { execute, undo } => (
                Self {
                    redo: execute,
                    undo,
                    group,
                },
                true,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sync_action_runs_on_call() {
        let hits = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&hits);
        let mut act = action(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // The closure runs when the action is invoked, not when awaited.
        let fut = act();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        fut.await.expect("action");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_action_propagates_error() {
        let mut act = async_action(|| async { Err::<(), _>(anyhow::anyhow!("boom")) });
        let err = act().await.expect_err("should fail");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_execute_entry_reuses_execute_as_redo() {
        let op = Operation::execute(|| Ok(()), || Ok(()));
        assert!(op.executes_on_add());
        let (entry, run_now) = Entry::from_operation(op, Some(GroupId(3)));
        assert!(run_now);
        assert_eq!(entry.group, Some(GroupId(3)));
    }

    #[test]
    fn test_record_entry_does_not_run_on_add() {
        let op = Operation::record(|| Ok(()), || Ok(()));
        assert!(!op.executes_on_add());
        let (entry, run_now) = Entry::from_operation(op, None);
        assert!(!run_now);
        assert_eq!(entry.group, None);
    }

    #[test]
    fn test_group_id_display() {
        assert_eq!(GroupId(7).to_string(), "group-7");
    }

    #[test]
    fn test_state_default_is_empty_history() {
        let state = HistoryState::default();
        assert!(!state.can_undo);
        assert!(!state.can_redo);
    }
}
