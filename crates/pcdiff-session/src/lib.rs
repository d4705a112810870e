//! pcdiff-session — current before/after snapshots and the comparison derived from them.
//!
//! Each load replaces exactly one slot. Loads for different roles may run
//! concurrently; concurrent loads of the same role race and the last one to
//! finish wins. The comparison is recomputed on every read and is never cached.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use pcdiff_compare::{compare_optional, ComparisonResult};
use pcdiff_core::{PointCloud, Role};
use pcdiff_io::{ParseOptions, ParseReport};
use tokio::io::AsyncRead;

#[derive(Clone, Debug)]
struct Loaded {
    cloud: Arc<PointCloud>,
    report: ParseReport,
}

#[derive(Default)]
struct Slots {
    before: Option<Loaded>,
    after: Option<Loaded>,
    version: u64,
}

impl Slots {
    fn slot(&self, role: Role) -> &Option<Loaded> {
        match role { Role::Before => &self.before, Role::After => &self.after }
    }
    fn slot_mut(&mut self, role: Role) -> &mut Option<Loaded> {
        match role { Role::Before => &mut self.before, Role::After => &mut self.after }
    }
}

/// Marks a read as in flight until dropped, on every exit path.
struct LoadGuard(Arc<AtomicUsize>);

impl LoadGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) { self.0.fetch_sub(1, Ordering::SeqCst); }
}

/// Shared handle; clones see the same slots.
#[derive(Clone, Default)]
pub struct Session {
    slots: Arc<Mutex<Slots>>,
    in_flight: Arc<AtomicUsize>,
    options: Arc<ParseOptions>,
}

impl Session {
    pub fn new(options: ParseOptions) -> Self {
        Self { options: Arc::new(options), ..Default::default() }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // slot writes are single assignments, so a poisoned lock still holds consistent data
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, role: Role, cloud: PointCloud, report: ParseReport) {
        log::info!(
            "{role}: loaded '{}' ({} points, {} short, {} malformed)",
            cloud.name, cloud.len(), report.short_line_count, report.malformed_row_count
        );
        let mut slots = self.lock();
        *slots.slot_mut(role) = Some(Loaded { cloud: Arc::new(cloud), report });
        slots.version += 1;
    }

    /// Read and parse `path` into the `role` slot. On error the slot keeps its previous value.
    pub async fn load_file(&self, path: impl AsRef<Path>, role: Role) -> Result<()> {
        let path = path.as_ref();
        let _guard = LoadGuard::new(&self.in_flight);
        match pcdiff_io::read_xyz_with_report(path, &self.options).await {
            Ok((cloud, report)) => {
                self.store(role, cloud, report);
                Ok(())
            }
            Err(e) => {
                log::warn!("{role}: failed to load {}: {e:#}", path.display());
                Err(e)
            }
        }
    }

    /// Like [`Session::load_file`] for an already-open handle.
    pub async fn load_from<R: AsyncRead + Unpin>(&self, reader: R, name: &str, role: Role) -> Result<()> {
        let _guard = LoadGuard::new(&self.in_flight);
        match pcdiff_io::read_xyz_from_with_report(reader, name, &self.options).await {
            Ok((cloud, report)) => {
                self.store(role, cloud, report);
                Ok(())
            }
            Err(e) => {
                log::warn!("{role}: failed to load {name}: {e:#}");
                Err(e)
            }
        }
    }

    /// Parse text that is already in memory.
    pub fn load_text(&self, text: &str, name: &str, role: Role) {
        let (cloud, report) = pcdiff_io::parse_xyz_with(text, name, &self.options);
        self.store(role, cloud, report);
    }

    /// True while any read is pending. Presentation only; it does not serialize loads.
    pub fn is_loading(&self) -> bool { self.in_flight.load(Ordering::SeqCst) > 0 }

    pub fn cloud(&self, role: Role) -> Option<Arc<PointCloud>> {
        self.lock().slot(role).as_ref().map(|l| l.cloud.clone())
    }
    pub fn before(&self) -> Option<Arc<PointCloud>> { self.cloud(Role::Before) }
    pub fn after(&self) -> Option<Arc<PointCloud>> { self.cloud(Role::After) }

    /// Diagnostics from the parse that produced the current `role` snapshot.
    pub fn report(&self, role: Role) -> Option<ParseReport> {
        self.lock().slot(role).as_ref().map(|l| l.report.clone())
    }

    /// Bumped on every slot change. Callers that memoize [`Session::comparison`] key on this.
    pub fn version(&self) -> u64 { self.lock().version }

    /// Fresh comparison of the current pair, `None` until both slots are filled.
    pub fn comparison(&self) -> Option<ComparisonResult> {
        let (before, after) = {
            let slots = self.lock();
            (
                slots.before.as_ref().map(|l| l.cloud.clone()),
                slots.after.as_ref().map(|l| l.cloud.clone()),
            )
        };
        compare_optional(before.as_deref(), after.as_deref())
    }

    pub fn clear(&self, role: Role) {
        let mut slots = self.lock();
        if slots.slot_mut(role).take().is_some() {
            slots.version += 1;
        }
    }

    pub fn clear_all(&self) {
        let mut slots = self.lock();
        slots.before = None;
        slots.after = None;
        slots.version += 1;
        log::debug!("cleared both snapshots");
    }
}
