//! Runs maze builds on a background thread on behalf of an `Order`, with cooperative
//! cancellation and a blocking wait for the result.

use std::sync::{
    atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::thread::{self, JoinHandle};

use error_chain::bail;
use log::{debug, error, info, warn};

use crate::builder::MazeBuilder;
use crate::errors::*;
use crate::generators::Algorithm;
use crate::maze::Maze;
use crate::units::Percent;

/// A request for a maze, and where to send it.
///
/// The factory calls `update_progress` and `deliver` from its worker thread.
pub trait Order: Send + Sync {
    fn skill_level(&self) -> i32;
    fn algorithm(&self) -> Algorithm;
    fn is_perfect(&self) -> bool;
    fn seed(&self) -> u64;
    fn deliver(&self, maze: Maze);
    fn update_progress(&self, percent: u8);
}

/// An order that keeps whatever it is given.
#[derive(Debug)]
pub struct StubOrder {
    skill_level: i32,
    algorithm: Algorithm,
    perfect: bool,
    seed: u64,
    maze: Mutex<Option<Maze>>,
    progress: AtomicU8,
    deliveries: AtomicUsize,
}

impl StubOrder {
    pub fn new(skill_level: i32, algorithm: Algorithm, perfect: bool, seed: u64) -> StubOrder {
        StubOrder {
            skill_level,
            algorithm,
            perfect,
            seed,
            maze: Mutex::new(None),
            progress: AtomicU8::new(0),
            deliveries: AtomicUsize::new(0),
        }
    }

    /// The delivered maze, if there is one.
    pub fn maze(&self) -> Option<Maze> {
        self.maze.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Highest progress value seen.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn deliveries(&self) -> usize {
        self.deliveries.load(Ordering::SeqCst)
    }
}

impl Order for StubOrder {
    fn skill_level(&self) -> i32 {
        self.skill_level
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn is_perfect(&self) -> bool {
        self.perfect
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn deliver(&self, maze: Maze) {
        *self.maze.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(maze);
        let _ = self.deliveries.fetch_add(1, Ordering::SeqCst);
    }

    fn update_progress(&self, percent: u8) {
        let _ = self.progress.fetch_max(percent, Ordering::SeqCst);
    }
}

/// Shared between a build and whoever started it: the cancellation flag plus the order that
/// progress is forwarded to.
pub struct BuildControl {
    cancelled: Arc<AtomicBool>,
    order: Option<Arc<dyn Order>>,
    progress: AtomicU8,
}

impl BuildControl {
    fn new(cancelled: Arc<AtomicBool>, order: Arc<dyn Order>) -> BuildControl {
        BuildControl {
            cancelled,
            order: Some(order),
            progress: AtomicU8::new(0),
        }
    }

    /// Not attached to any order; progress goes nowhere.
    pub fn detached() -> BuildControl {
        BuildControl {
            cancelled: Arc::new(AtomicBool::new(false)),
            order: None,
            progress: AtomicU8::new(0),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Cancelled` once cancellation was requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            bail!(ErrorKind::Cancelled);
        }
        Ok(())
    }

    /// Forward `percent` to the order if it is higher than anything reported before.
    pub fn report_progress(&self, percent: Percent) {
        let Percent(value) = percent;
        let value = value.min(100);
        let previous = self.progress.fetch_max(value, Ordering::SeqCst);
        if value > previous {
            if let Some(ref order) = self.order {
                order.update_progress(value);
            }
        }
    }

    pub fn progress(&self) -> Percent {
        Percent(self.progress.load(Ordering::SeqCst))
    }
}

/// How the last submitted build ended.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Completion {
    Delivered,
    Cancelled,
    /// Nothing was submitted, or the result was already collected.
    Idle,
}

/// Cancels one particular build. Cancelling a build that already finished does nothing.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct Worker {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<Result<Completion>>,
}

impl Worker {
    fn join(self) -> Result<Completion> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!("maze build worker panicked");
                bail!(ErrorKind::WorkerPanicked)
            }
        }
    }
}

/// Builds one maze at a time off the caller's thread.
#[derive(Default)]
pub struct MazeFactory {
    worker: Option<Worker>,
}

impl MazeFactory {
    pub fn new() -> MazeFactory {
        MazeFactory { worker: None }
    }

    /// Start building `order`'s maze. Invalid orders are rejected here, before any thread
    /// starts. A build still in flight is cancelled and reaped first.
    pub fn submit(&mut self, order: Arc<dyn Order>) -> Result<()> {
        let builder = MazeBuilder::from_order(order.as_ref())?;

        if let Some(previous) = self.worker.take() {
            debug!("cancelling the previous build");
            previous.cancelled.store(true, Ordering::SeqCst);
            // The old worker may be stuck in its order's progress callback, reap it elsewhere.
            let reaper = thread::Builder::new()
                .name("maze-reaper".to_string())
                .spawn(move || {
                    if let Err(e) = previous.join() {
                        warn!("previous build ended with an error: {}", e);
                    }
                });
            if let Err(e) = reaper {
                warn!("could not start a thread to reap the previous build: {}", e);
            }
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let control = BuildControl::new(Arc::clone(&cancelled), Arc::clone(&order));
        let handle = thread::Builder::new()
            .name("maze-builder".to_string())
            .spawn(move || run_build(&builder, &control, order.as_ref()))
            .chain_err(|| "could not start the maze build worker")?;

        self.worker = Some(Worker { cancelled, handle });
        Ok(())
    }

    /// Ask the current build to stop. Returns straight away; the worker notices between rows.
    pub fn cancel(&self) {
        if let Some(ref worker) = self.worker {
            worker.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// A handle that cancels the current build from another thread, for instance while this
    /// factory is blocked in `await_completion`. None when nothing was submitted.
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.worker.as_ref().map(|worker| CancelHandle { cancelled: Arc::clone(&worker.cancelled) })
    }

    /// Block until the current build finishes.
    pub fn await_completion(&mut self) -> Result<Completion> {
        match self.worker.take() {
            Some(worker) => worker.join(),
            None => Ok(Completion::Idle),
        }
    }

    pub fn is_building(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| !w.cancelled.load(Ordering::SeqCst))
    }
}

impl Drop for MazeFactory {
    fn drop(&mut self) {
        self.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_build(builder: &MazeBuilder, control: &BuildControl, order: &dyn Order) -> Result<Completion> {
    match builder.build(control) {
        Ok(maze) => {
            if control.is_cancelled() {
                warn!("build cancelled after it finished, not delivering");
                return Ok(Completion::Cancelled);
            }
            info!("delivering a {}x{} maze", maze.width().0, maze.height().0);
            order.deliver(maze);
            Ok(Completion::Delivered)
        }
        Err(ref e) if e.is_cancelled() => {
            warn!("build cancelled at {}%", control.progress().0);
            Ok(Completion::Cancelled)
        }
        Err(e) => {
            error!("maze build failed: {}", e);
            Err(e)
        }
    }
}
