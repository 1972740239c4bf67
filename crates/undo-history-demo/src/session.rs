// A HistoryManager driving a shared counter, one command at a time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use undo_history::{HistoryConfig, HistoryManager, HistoryState, Operation};

use crate::command::Command;

pub struct Session {
    history: HistoryManager,
    counter: Arc<AtomicI64>,
}

impl Session {
    pub fn new(config: HistoryConfig) -> Self {
        let history = HistoryManager::new(config).with_on_change(|state: HistoryState| {
            tracing::info!(
                can_undo = state.can_undo,
                can_redo = state.can_redo,
                "Undo/redo availability changed"
            );
        });
        Self {
            history,
            counter: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn value(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Applies a command. History bookkeeping survives a failed command.
    pub async fn apply(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Add(n) => {
                let op = self.shift(n, true);
                self.history.add(op).await
            }
            Command::Record(n) => {
                let op = self.shift(n, false);
                self.history.add(op).await
            }
            Command::Undo => self.history.undo().await,
            Command::Redo => self.history.redo().await,
            Command::Begin => {
                self.history.start_group()?;
                Ok(())
            }
            Command::End => {
                self.history.end_group();
                Ok(())
            }
            Command::Clear => {
                self.history.clear();
                Ok(())
            }
            Command::State => Ok(()),
            Command::Fail => {
                let op = Operation::execute(
                    || Err(anyhow!("Simulated failure")),
                    || Ok(()),
                );
                self.history.add(op).await
            }
        }
    }

    /// One-line summary of the counter and history flags.
    pub fn status(&self) -> String {
        let h = &self.history;
        format!(
            "value={} entries={} index={} can_undo={} can_redo={}{}",
            self.value(),
            h.len(),
            h.index().map_or_else(|| "-".to_string(), |i| i.to_string()),
            h.can_undo(),
            h.can_redo(),
            h.active_group()
                .map(|g| format!(" grouping={g}"))
                .unwrap_or_default(),
        )
    }

    /// Operation adding `n` to the counter; undo subtracts it.
    fn shift(&self, n: i64, execute: bool) -> Operation {
        let forward = Arc::clone(&self.counter);
        let backward = Arc::clone(&self.counter);
        let apply = move || -> Result<()> {
            forward.fetch_add(n, Ordering::SeqCst);
            Ok(())
        };
        let revert = move || -> Result<()> {
            backward.fetch_sub(n, Ordering::SeqCst);
            Ok(())
        };
        if execute {
            Operation::execute(apply, revert)
        } else {
            Operation::record(apply, revert)
        }
    }
}
