/// Usage errors raised by the history manager itself.
///
/// Failures of host-supplied callbacks are not wrapped here; they are
/// returned to the caller unchanged as `anyhow::Error`.
use thiserror::Error;

use crate::operation::GroupId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// `start_group` was called while a group was already open.
    #[error("already grouping ({0})")]
    AlreadyGrouping(GroupId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_grouping_message() {
        let err = HistoryError::AlreadyGrouping(GroupId(2));
        assert_eq!(err.to_string(), "already grouping (group-2)");
    }
}
