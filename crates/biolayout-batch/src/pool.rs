use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use biolayout_core::SpringOptions;
use biolayout_model::Group;

use crate::codec;
use crate::error::{Error, Result};

/// How long an idle worker waits on the queue before re-checking the stop
/// flag.
const IDLE_INTERVAL: Duration = Duration::from_millis(100);

const PROGRESS_INTERVAL: u64 = 100;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub workers: usize,
    /// Solver options applied to every group. The seed is per-group state,
    /// so results are independent of which worker picks a group up.
    pub spring: SpringOptions,
    /// Deflate the encoded artifact for storage.
    pub compress: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            spring: SpringOptions::default(),
            compress: true,
        }
    }
}

/// A group whose genes now carry final coordinates, plus the encoded
/// artifact ready for the store.
#[derive(Debug)]
pub struct LaidOutGroup {
    pub group: Group,
    pub artifact: Vec<u8>,
    pub iterations: u64,
    pub stress: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PoolStats {
    pub processed: u64,
    /// Groups rejected by construction-time validation. These are input
    /// defects; the pool logs them and keeps draining the queue.
    pub failed: u64,
}

/// Worker pool laying out independent groups in parallel.
///
/// Each worker pulls the next group from the shared queue and runs its own
/// solver on it; no simulation state crosses threads. The stop signal is
/// cooperative and checked *between* groups — an in-flight layout always
/// completes.
pub struct LayoutPool {
    input: Sender<Group>,
    output: Receiver<LaidOutGroup>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<PoolStats>>,
}

impl LayoutPool {
    pub fn start(config: PoolConfig) -> Result<Self> {
        let (input_tx, input_rx) = unbounded::<Group>();
        let (output_tx, output_rx) = unbounded::<LaidOutGroup>();
        let stop = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicU64::new(0));

        let mut workers = Vec::with_capacity(config.workers.max(1));
        for index in 0..config.workers.max(1) {
            let input = input_rx.clone();
            let output = output_tx.clone();
            let stop = Arc::clone(&stop);
            let progress = Arc::clone(&progress);
            let config = config.clone();
            let handle = std::thread::Builder::new()
                .name(format!("layout-{index}"))
                .spawn(move || worker_loop(input, output, stop, progress, config))?;
            workers.push(handle);
        }

        Ok(Self {
            input: input_tx,
            output: output_rx,
            stop,
            workers,
        })
    }

    /// Queues a group for layout.
    pub fn submit(&self, group: Group) -> Result<()> {
        self.input.send(group).map_err(|_| Error::QueueClosed)
    }

    /// Finished groups, in completion order.
    pub fn results(&self) -> &Receiver<LaidOutGroup> {
        &self.output
    }

    /// Requests cooperative shutdown. Queued but unstarted groups are
    /// abandoned; in-flight layouts complete.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Closes the queue, waits for the workers to drain it, and returns the
    /// aggregate counters.
    pub fn join(self) -> Result<PoolStats> {
        let Self {
            input,
            output: _output,
            stop: _stop,
            workers,
        } = self;
        drop(input);
        let mut total = PoolStats::default();
        for handle in workers {
            let stats = handle.join().map_err(|_| Error::WorkerPanic)?;
            total.processed += stats.processed;
            total.failed += stats.failed;
        }
        Ok(total)
    }
}

/// Lays out every group and collects the results. Convenience wrapper over
/// [`LayoutPool`] for headless batch runs.
pub fn layout_all(groups: Vec<Group>, config: PoolConfig) -> Result<(Vec<LaidOutGroup>, PoolStats)> {
    let pool = LayoutPool::start(config)?;
    for group in groups {
        pool.submit(group)?;
    }
    let output = pool.results().clone();
    let stats = pool.join()?;
    let results: Vec<LaidOutGroup> = output.try_iter().collect();
    Ok((results, stats))
}

fn worker_loop(
    input: Receiver<Group>,
    output: Sender<LaidOutGroup>,
    stop: Arc<AtomicBool>,
    progress: Arc<AtomicU64>,
    config: PoolConfig,
) -> PoolStats {
    let mut stats = PoolStats::default();
    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match input.recv_timeout(IDLE_INTERVAL) {
            Ok(group) => match process_group(group, &config) {
                Ok(done) => {
                    stats.processed += 1;
                    let total = progress.fetch_add(1, Ordering::Relaxed) + 1;
                    if total.is_multiple_of(PROGRESS_INTERVAL) {
                        tracing::info!(groups = total, "layout progress");
                    }
                    tracing::debug!(
                        group = done.group.name(),
                        iterations = done.iterations,
                        stress = done.stress,
                        "group laid out"
                    );
                    if output.send(done).is_err() {
                        // Nobody is listening for results any more.
                        break;
                    }
                }
                Err(err) => {
                    stats.failed += 1;
                    tracing::warn!(error = %err, "skipping malformed group");
                }
            },
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    stats
}

fn process_group(mut group: Group, config: &PoolConfig) -> Result<LaidOutGroup> {
    let result = biolayout_core::layout(&group, config.spring.clone())?;
    group.apply_layout(&result);
    let encoded = codec::encode(&group);
    let artifact = if config.compress {
        codec::compress(&encoded)?
    } else {
        encoded
    };
    Ok(LaidOutGroup {
        group,
        artifact,
        iterations: result.iterations,
        stress: result.stress,
    })
}
