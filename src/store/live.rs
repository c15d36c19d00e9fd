use std::fmt;

use tokio::sync::watch;

use super::Database;

type Query<T> = Box<dyn Fn(&Database) -> T + Send + Sync>;

/// Query result that follows the database.
///
/// The first [`LiveQuery::next`] yields the current result immediately; each
/// later call waits for the next committed write and re-runs the query.
/// Several writes between two calls yield a single result (latest wins).
pub struct LiveQuery<T> {
    db: Database,
    changes: watch::Receiver<u64>,
    query: Query<T>,
    primed: bool,
}

impl<T> LiveQuery<T> {
    pub(super) fn new(db: Database, changes: watch::Receiver<u64>, query: Query<T>) -> Self {
        Self {
            db,
            changes,
            query,
            primed: false,
        }
    }

    /// Runs the query now without consuming a change.
    pub fn current(&self) -> T {
        (self.query)(&self.db)
    }

    /// Waits for the next result.
    ///
    /// Returns `None` only if the database has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        self.primed = true;
        self.changes.borrow_and_update();
        Some(self.current())
    }

    /// Returns true if a write has been committed since the last result.
    pub fn has_changed(&self) -> bool {
        !self.primed || self.changes.has_changed().unwrap_or(false)
    }
}

impl<T> fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("revision", &*self.changes.borrow())
            .field("primed", &self.primed)
            .finish_non_exhaustive()
    }
}
