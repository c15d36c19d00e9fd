//! Embedded workout database.
//!
//! All tables live in memory behind one lock. Writes run as transactions on a
//! copy of the tables and are committed only if the closure succeeds, so a
//! failed insert never leaves half-applied cascades behind. Every commit bumps
//! a revision counter that [`LiveQuery`] watches.
//!
//! Foreign keys follow these rules:
//!
//! | child            | parent            | on delete |
//! |------------------|-------------------|-----------|
//! | template         | folder            | set null  |
//! | template exercise| template          | cascade   |
//! | template set     | template exercise | cascade   |
//! | session          | template          | set null  |
//! | exercise log     | session           | cascade   |
//! | set log          | exercise log      | cascade   |
//! | weight entry     | phase             | set null  |

mod body;
mod catalog;
mod error;
mod live;
mod sessions;
mod templates;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::model::{
    CustomExercise, CustomExerciseId, ExerciseLog, ExerciseLogId, Folder, FolderId, Phase,
    PhaseId, Session, SessionId, SetLog, SetLogId, Template, TemplateExercise, TemplateExerciseId,
    TemplateId, TemplateSet, TemplateSetId, WeightEntry, WeightEntryId,
};

pub use error::StoreError;
pub use live::LiveQuery;

/// Format version written into snapshots.
const SNAPSHOT_VERSION: u32 = 1;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Tables {
    folders: BTreeMap<FolderId, Folder>,
    templates: BTreeMap<TemplateId, Template>,
    template_exercises: BTreeMap<TemplateExerciseId, TemplateExercise>,
    template_sets: BTreeMap<TemplateSetId, TemplateSet>,
    sessions: BTreeMap<SessionId, Session>,
    exercise_logs: BTreeMap<ExerciseLogId, ExerciseLog>,
    set_logs: BTreeMap<SetLogId, SetLog>,
    phases: BTreeMap<PhaseId, Phase>,
    weight_entries: BTreeMap<WeightEntryId, WeightEntry>,
    custom_exercises: BTreeMap<CustomExerciseId, CustomExercise>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    tables: Tables,
}

#[derive(Debug)]
struct Inner {
    tables: RwLock<Tables>,
    revision: watch::Sender<u64>,
}

/// Handle to the database. Clones share the same tables.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tables(Tables::default())
    }

    fn from_tables(tables: Tables) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(tables),
                revision,
            }),
        }
    }

    /// Loads a snapshot written by [`Database::save`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::InvalidInput(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        info!(path = %path.display(), "Database loaded");
        Ok(Self::from_tables(snapshot.tables))
    }

    /// Loads `path`, or starts empty if the file does not exist yet.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        match Self::open(path.as_ref()) {
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            other => other,
        }
    }

    /// Writes all tables to `path` as JSON.
    ///
    /// The file is replaced atomically via a sibling temporary file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.read(|tables| {
            serde_json::to_string_pretty(&Snapshot {
                version: SNAPSHOT_VERSION,
                tables: tables.clone(),
            })
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "Database saved");
        Ok(())
    }

    /// Number of committed write transactions.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Returns a query that re-runs after every committed change.
    pub fn live<T, F>(&self, query: F) -> LiveQuery<T>
    where
        F: Fn(&Database) -> T + Send + Sync + 'static,
    {
        LiveQuery::new(self.clone(), self.inner.revision.subscribe(), Box::new(query))
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self
            .inner
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Tables) -> Result<R>) -> Result<R> {
        let mut tables = self
            .inner
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut staged = tables.clone();
        let result = f(&mut staged)?;
        *tables = staged;
        drop(tables);

        self.inner.revision.send_modify(|rev| *rev += 1);
        Ok(result)
    }
}

/// Position after the last of `positions`.
fn next_position(positions: impl Iterator<Item = u32>) -> u32 {
    positions.max().map_or(0, |p| p + 1)
}

/// Rejects blank names and returns the trimmed name.
fn require_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidInput(format!("{what} name must not be empty")));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_write_is_not_committed() {
        let db = Database::new();
        let folder = db.create_folder("Push").unwrap();
        let before = db.revision();

        let result = db.write(|tables| {
            tables.folders.clear();
            Err::<(), _>(StoreError::InvalidInput("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(db.revision(), before);
        assert_eq!(db.folders(), vec![folder]);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("liftlog.json");

        let db = Database::new();
        let folder = db.create_folder("Legs").unwrap();
        let template = db.create_template("Squat Day", Some(folder.id), Some(180)).unwrap();
        db.add_template_exercise(template.id, "Squat", None).unwrap();
        db.save(&path).unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.folders(), vec![folder]);
        assert_eq!(reopened.template(template.id), db.template(template.id));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(Database::open(&path), Err(StoreError::Io(_))));
        assert!(Database::open_or_create(&path).unwrap().folders().is_empty());
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{").unwrap();

        assert!(matches!(
            Database::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_clones_share_tables() {
        let db = Database::new();
        let other = db.clone();
        db.create_folder("A").unwrap();
        assert_eq!(other.folders().len(), 1);
        assert_eq!(other.revision(), 1);
    }

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(std::iter::empty()), 0);
        assert_eq!(next_position([0, 3, 1].into_iter()), 4);
    }
}
