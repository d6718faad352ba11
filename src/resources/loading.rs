//! Startup barrier.
//!
//! Every startup load registers itself and receives a [`LoadTicket`]. The
//! loader completes its ticket when it is done (or fails it), and
//! [`LoadBarrier::wait`] resolves once every registered ticket has reported,
//! calling back with a [`LoadProgress`] after each one. A ticket dropped
//! without reporting counts as a failed load, so the barrier can never hang
//! on a loader that bailed out early.

use std::cell::Cell;

use futures::stream::{FuturesUnordered, StreamExt};
use futures_intrusive::channel::shared::{OneshotReceiver, OneshotSender, oneshot_channel};

use crate::resources::AssetSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub completed: usize,
    pub total: usize,
    pub bytes_loaded: usize,
}

impl LoadProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }

    /// Share of finished loads in `[0, 1]`. An empty barrier is complete.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { bytes: usize },
    Failed(String),
}

pub struct LoadTicket {
    label: String,
    sender: OneshotSender<LoadStatus>,
}

impl LoadTicket {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn complete(self, bytes: usize) {
        self.finish(LoadStatus::Loaded { bytes });
    }

    pub fn fail(self, reason: &str) {
        self.finish(LoadStatus::Failed(reason.to_string()));
    }

    fn finish(self, status: LoadStatus) {
        if self.sender.send(status).is_err() {
            log::debug!("Nobody is waiting for {} any more", self.label);
        }
    }
}

#[derive(Default)]
pub struct LoadBarrier {
    pending: Vec<(String, OneshotReceiver<LoadStatus>)>,
}

impl LoadBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, label: &str) -> LoadTicket {
        let (sender, receiver) = oneshot_channel();
        self.pending.push((label.to_string(), receiver));
        LoadTicket {
            label: label.to_string(),
            sender,
        }
    }

    pub fn total(&self) -> usize {
        self.pending.len()
    }

    /// Resolve once every ticket reported. Statuses are returned in completion order.
    pub async fn wait<F: FnMut(LoadProgress)>(self, mut on_progress: F) -> Vec<(String, LoadStatus)> {
        let mut progress = LoadProgress {
            completed: 0,
            total: self.pending.len(),
            bytes_loaded: 0,
        };
        let mut waiting: FuturesUnordered<_> = self
            .pending
            .into_iter()
            .map(|(label, receiver)| async move {
                let status = receiver
                    .receive()
                    .await
                    .unwrap_or_else(|| LoadStatus::Failed("loader dropped its ticket".to_string()));
                (label, status)
            })
            .collect();

        let mut finished = Vec::with_capacity(progress.total);
        while let Some((label, status)) = waiting.next().await {
            progress.completed += 1;
            match &status {
                LoadStatus::Loaded { bytes } => {
                    progress.bytes_loaded += bytes;
                    log::info!(
                        "Loaded {} ({}/{}, {} bytes so far)",
                        label,
                        progress.completed,
                        progress.total,
                        progress.bytes_loaded
                    );
                }
                LoadStatus::Failed(reason) => {
                    log::error!("Failed to load {}: {}", label, reason);
                }
            }
            on_progress(progress);
            finished.push((label, status));
        }
        finished
    }
}

/// Counts the bytes fetched through the wrapped source.
pub struct Metered<'a, A> {
    inner: &'a A,
    bytes: Cell<usize>,
}

impl<'a, A: AssetSource> Metered<'a, A> {
    pub fn new(inner: &'a A) -> Self {
        Self {
            inner,
            bytes: Cell::new(0),
        }
    }

    pub fn bytes(&self) -> usize {
        self.bytes.get()
    }
}

impl<A: AssetSource> AssetSource for Metered<'_, A> {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let data = self.inner.fetch(path).await?;
        self.bytes.set(self.bytes.get() + data.len());
        Ok(data)
    }
}
