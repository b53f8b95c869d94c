//! Modification-time probing and an optional background poller.
//!
//! The render loop can call [`crate::Shader::check_for_changes`] every frame,
//! which costs two `stat` calls. [`SourceWatcher`] moves that polling onto a
//! helper thread: it only stats files and sends [`SourceChanged`] over a
//! channel. Recompilation still happens on the thread that owns the GL
//! context, via [`crate::Shader::reload_if_signalled`].
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::{GlError, Result};
use crate::shader::{ReloadSettings, Shader};

/// Source of file modification times.
pub trait ModificationProbe {
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Reads modification times from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl ModificationProbe for FsProbe {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChanged {
    pub path: PathBuf,
}

pub struct SourceWatcher {
    events: Receiver<SourceChanged>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SourceWatcher {
    /// Starts polling `paths` every `interval`.
    ///
    /// The first snapshot is taken before this returns, so any write that
    /// lands afterwards is reported.
    pub fn spawn(paths: impl IntoIterator<Item = PathBuf>, interval: Duration) -> Result<Self> {
        let snapshot = paths
            .into_iter()
            .map(|path| {
                let modified = FsProbe.modified(&path).ok();
                (path, modified)
            })
            .collect();
        Self::spawn_with_snapshot(snapshot, interval)
    }

    /// Starts polling with caller-supplied baseline times.
    ///
    /// Any path whose time on disk already differs from its baseline is
    /// reported on the first poll.
    pub fn spawn_with_snapshot(
        mut snapshot: Vec<(PathBuf, Option<SystemTime>)>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(GlError::Watcher(io::Error::new(
                io::ErrorKind::InvalidInput,
                "watch interval must be greater than zero",
            )));
        }

        let (event_tx, events) = unbounded();
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let worker = thread::Builder::new()
            .name("glkit-watch".into())
            .spawn(move || {
                tracing::debug!(files = snapshot.len(), ?interval, "source watcher started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if !poll_once(&mut snapshot, &FsProbe, &event_tx) {
                        break;
                    }
                }
                tracing::debug!("source watcher stopped");
            })
            .map_err(GlError::Watcher)?;

        Ok(Self {
            events,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Watches the two source files of `shader`, measured against the times
    /// its current program was built from.
    pub fn for_shader(shader: &Shader, interval: Duration) -> Result<Self> {
        let (vertex, fragment) = shader.modification_times();
        Self::spawn_with_snapshot(
            vec![
                (shader.vertex_path().to_path_buf(), Some(vertex)),
                (shader.fragment_path().to_path_buf(), Some(fragment)),
            ],
            interval,
        )
    }

    /// Starts a watcher for `shader` when `settings` ask for one.
    pub fn from_settings(shader: &Shader, settings: &ReloadSettings) -> Result<Option<Self>> {
        settings
            .watch_interval
            .map(|interval| Self::for_shader(shader, interval))
            .transpose()
    }

    pub fn events(&self) -> &Receiver<SourceChanged> {
        &self.events
    }

    /// Takes every pending notification without blocking.
    pub fn drain(&self) -> Vec<SourceChanged> {
        self.events.try_iter().collect()
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the worker immediately.
        self.stop_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("source watcher thread panicked");
            }
        }
    }
}

/// Stats every path once and reports those whose time moved. Returns `false`
/// once nobody is listening.
fn poll_once(
    snapshot: &mut [(PathBuf, Option<SystemTime>)],
    probe: &impl ModificationProbe,
    events: &Sender<SourceChanged>,
) -> bool {
    for (path, last) in snapshot.iter_mut() {
        let current = match probe.modified(path) {
            Ok(modified) => Some(modified),
            Err(err) => {
                // Editors that save by rename leave a short gap with no file.
                tracing::trace!(path = %path.display(), error = %err, "stat failed");
                None
            }
        };
        if current == *last {
            continue;
        }
        let present = current.is_some();
        *last = current;
        if present
            && events
                .send(SourceChanged { path: path.clone() })
                .is_err()
        {
            return false;
        }
    }
    true
}
