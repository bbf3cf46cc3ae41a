//! Append-only record of the buckets and objects a run created.
//!
//! Entries are grouped into partitions by how they came to exist. Steps look
//! up "the first bucket" or "every object" here instead of reaching for
//! process-wide state, and suite-level cleanup walks the same records.

use crate::errors::{HarnessError, HarnessResult};
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// Named subset of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Created by the test steps of this run.
    AdHoc,
    /// Created by a `--prepare` run, or handed in through configuration.
    Prepared,
    /// Created by copying another object.
    Copied,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Partition::AdHoc => "ad-hoc",
            Partition::Prepared => "prepared",
            Partition::Copied => "copied",
        };
        f.write_str(name)
    }
}

/// Per-partition ordered lists. Insertion order is preserved and nothing is
/// ever removed while a run is in progress.
///
/// Each partition sits behind its own lock, so a reader always gets a
/// consistent snapshot even if another task is appending.
pub struct Registry<T> {
    kind: &'static str,
    ad_hoc: RwLock<Vec<Arc<T>>>,
    prepared: RwLock<Vec<Arc<T>>>,
    copied: RwLock<Vec<Arc<T>>>,
}

impl<T> Registry<T> {
    /// `kind` names the recorded entity in errors ("bucket", "object").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            ad_hoc: RwLock::new(Vec::new()),
            prepared: RwLock::new(Vec::new()),
            copied: RwLock::new(Vec::new()),
        }
    }

    fn slot(&self, partition: Partition) -> &RwLock<Vec<Arc<T>>> {
        match partition {
            Partition::AdHoc => &self.ad_hoc,
            Partition::Prepared => &self.prepared,
            Partition::Copied => &self.copied,
        }
    }

    pub fn append(&self, partition: Partition, entry: T) -> Arc<T> {
        let entry = Arc::new(entry);
        let mut guard = self
            .slot(partition)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.push(Arc::clone(&entry));
        debug!(
            "registered {} #{} in {} partition",
            self.kind,
            guard.len(),
            partition
        );
        entry
    }

    /// Snapshot of a partition in insertion order.
    pub fn all(&self, partition: Partition) -> Vec<Arc<T>> {
        self.slot(partition)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Earliest entry of a partition.
    pub fn first(&self, partition: Partition) -> HarnessResult<Arc<T>> {
        self.slot(partition)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .cloned()
            .ok_or(HarnessError::RegistryEmpty {
                kind: self.kind,
                partition,
            })
    }

    pub fn len(&self, partition: Partition) -> usize {
        self.slot(partition)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self, partition: Partition) -> bool {
        self.len(partition) == 0
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("ad_hoc", &self.len(Partition::AdHoc))
            .field("prepared", &self.len(Partition::Prepared))
            .field("copied", &self.len(Partition::Copied))
            .finish()
    }
}
