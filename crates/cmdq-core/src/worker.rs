//! Single-worker concurrent task queue.
//!
//! One dedicated thread pulls tasks from a mutex-guarded FIFO and waits on a
//! condvar when there is nothing to do. Two stop modes:
//!
//! - soft stop: finish everything queued, then exit once the queue is empty.
//! - hard stop: finish the task in flight (if any), drop the rest, exit.
//!
//! Both flags live under the same mutex as the FIFO, so a stop signal can never
//! slip between the worker's emptiness check and its wait.
//!
//! # Closing
//!
//! Either stop signal closes the queue for new work. `add_task` checks the
//! flags under the same lock the worker uses and returns
//! [`CmdqError::QueueClosed`] instead of queuing a task nobody would run.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::command::Operation;
use crate::config::EngineConfig;
use crate::error::CmdqError;
use crate::observability::{StopReason, WorkerReport};

/// Error type tasks may return.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

type Task = Box<dyn FnOnce() -> Result<(), TaskError> + Send>;

struct State {
    tasks: VecDeque<Task>,
    soft_stop: bool,
    hard_stop: bool,
}

struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Tasks run outside the lock, so a poisoned guard still holds a valid queue.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// FIFO task queue served by exactly one background worker.
///
/// Tasks may be added before or after `start` and until a stop is requested;
/// order is always enqueue order.
/// The owner must eventually call `soft_stop` or `hard_stop` before `join`,
/// otherwise `join` waits forever. Dropping a started queue without joining
/// issues a hard stop and joins.
pub struct ConcurrentTaskQueue {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<WorkerReport>>,
    started: bool,
    thread_name: String,
}

impl ConcurrentTaskQueue {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Queue whose worker thread is named after `config.worker_thread_name`.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    tasks: VecDeque::new(),
                    soft_stop: false,
                    hard_stop: false,
                }),
                condvar: Condvar::new(),
            }),
            worker: None,
            started: false,
            thread_name: config.worker_thread_name.clone(),
        }
    }

    /// Append a task and wake the worker.
    ///
    /// Fails with `QueueClosed` once `soft_stop` or `hard_stop` was called;
    /// the task is dropped unrun.
    pub fn add_task<F>(&self, task: F) -> Result<(), CmdqError>
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        let mut state = self.shared.lock();
        if state.soft_stop || state.hard_stop {
            tracing::warn!("task rejected: queue is closed");
            return Err(CmdqError::QueueClosed);
        }
        state.tasks.push_back(Box::new(task));
        self.shared.condvar.notify_all();
        Ok(())
    }

    /// Run an `Operation` on the worker; its failure is reported like any task error.
    pub fn add_operation(&self, mut operation: impl Operation + 'static) -> Result<(), CmdqError> {
        self.add_task(move || operation.execute().map_err(TaskError::from))
    }

    /// Spawn the worker thread. Only one worker is ever spawned per queue.
    pub fn start(&mut self) -> Result<(), CmdqError> {
        if self.started {
            return Err(CmdqError::WorkerAlreadyStarted);
        }
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker_loop(&shared))
            .map_err(|e| CmdqError::WorkerSpawn(e.to_string()))?;
        self.worker = Some(handle);
        self.started = true;
        tracing::info!(thread = %self.thread_name, "worker started");
        Ok(())
    }

    /// Drain everything queued, then exit.
    pub fn soft_stop(&self) {
        tracing::info!("soft stop requested; exiting after queued tasks complete");
        let mut state = self.shared.lock();
        state.soft_stop = true;
        self.shared.condvar.notify_all();
    }

    /// Exit after the task in flight; queued tasks are abandoned.
    pub fn hard_stop(&self) {
        tracing::info!("hard stop requested");
        let mut state = self.shared.lock();
        state.hard_stop = true;
        self.shared.condvar.notify_all();
    }

    /// Tasks queued and not yet picked up.
    pub fn pending(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// True while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Wait for the worker to exit. Call once, after a stop signal.
    pub fn join(&mut self) -> Result<WorkerReport, CmdqError> {
        let handle = self.worker.take().ok_or(CmdqError::WorkerNotRunning)?;
        handle.join().map_err(|_| CmdqError::WorkerPanicked)
    }

    /// `join` on tokio's blocking pool.
    pub async fn join_async(mut self) -> Result<WorkerReport, CmdqError> {
        tokio::task::spawn_blocking(move || self.join())
            .await
            .map_err(|e| CmdqError::Join(e.to_string()))?
    }
}

impl Default for ConcurrentTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConcurrentTaskQueue {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.hard_stop();
            if let Err(e) = self.join() {
                tracing::error!(error = %e, "worker did not shut down cleanly");
            }
        }
    }
}

fn worker_loop(shared: &Shared) -> WorkerReport {
    let mut executed = 0;
    let mut failed = 0;

    loop {
        let task = {
            let mut state = shared.lock();
            loop {
                if state.hard_stop {
                    let abandoned = state.tasks.len();
                    state.tasks.clear();
                    tracing::info!(abandoned, "hard stop: worker exiting");
                    return WorkerReport {
                        executed,
                        failed,
                        abandoned,
                        stop_reason: StopReason::Hard,
                    };
                }
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                if state.soft_stop {
                    tracing::info!(executed, "all tasks completed after soft stop");
                    return WorkerReport {
                        executed,
                        failed,
                        abandoned: 0,
                        stop_reason: StopReason::Soft,
                    };
                }
                tracing::trace!("waiting for tasks");
                state = shared
                    .condvar
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        executed += 1;
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failed += 1;
                tracing::error!(error = %e, "task failed");
            }
            Err(payload) => {
                failed += 1;
                tracing::error!(panic = panic_message(payload.as_ref()), "task panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FnOperation;
    use crate::domain::OperationError;
    use std::sync::mpsc;
    use std::time::Duration;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Box<dyn FnOnce() -> Result<(), TaskError> + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = log.clone();
        let make = move |n: u32| {
            let log = handle.clone();
            Box::new(move || {
                log.lock().unwrap().push(n);
                Ok(())
            }) as Box<dyn FnOnce() -> Result<(), TaskError> + Send>
        };
        (log, make)
    }

    #[test]
    fn fifo_preserved_when_enqueued_before_start() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        for n in 1..=3 {
            queue.add_task(make(n)).unwrap();
        }
        queue.start().unwrap();
        queue.soft_stop();

        let report = queue.join().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(report.executed, 3);
        assert_eq!(report.stop_reason, StopReason::Soft);
    }

    #[test]
    fn soft_stop_before_start_still_drains_everything() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        for n in 1..=3 {
            queue.add_task(make(n)).unwrap();
        }
        queue.soft_stop();
        queue.start().unwrap();

        let report = queue.join().unwrap();
        assert_eq!(log.lock().unwrap().len(), 3);
        assert_eq!(report.abandoned, 0);
    }

    #[test]
    fn hard_stop_abandons_queued_tasks() {
        let (log, make) = recorder();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let mut queue = ConcurrentTaskQueue::new();
        queue.add_task(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            Ok(())
        })
        .unwrap();
        queue.add_task(make(2)).unwrap();
        queue.start().unwrap();

        // first task is in flight, second still queued
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        queue.hard_stop();
        release_tx.send(()).unwrap();

        let report = queue.join().unwrap();
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(report.executed, 1);
        assert_eq!(report.abandoned, 1);
        assert_eq!(report.stop_reason, StopReason::Hard);
    }

    #[test]
    fn hard_stop_on_idle_worker_exits() {
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();
        queue.hard_stop();
        let report = queue.join().unwrap();
        assert_eq!(report.executed, 0);
        assert_eq!(report.abandoned, 0);
    }

    #[test]
    fn tasks_added_while_running_are_executed() {
        let (done_tx, done_rx) = mpsc::channel();
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();

        for n in 0..5 {
            let tx = done_tx.clone();
            queue.add_task(move || {
                tx.send(n).unwrap();
                Ok(())
            })
            .unwrap();
        }
        let got: Vec<i32> = (0..5)
            .map(|_| done_rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);

        queue.soft_stop();
        assert_eq!(queue.join().unwrap().executed, 5);
    }

    #[test]
    fn failing_and_panicking_tasks_do_not_kill_worker() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        queue.add_task(|| Err("task failed on purpose".into())).unwrap();
        queue.add_task(|| panic!("task panicked on purpose")).unwrap();
        queue.add_operation(FnOperation::new("CheckFuelCommand", || {
            Err(OperationError::transient("CheckFuelCommand", "Not enough fuel"))
        }))
        .unwrap();
        queue.add_task(make(4)).unwrap();
        queue.start().unwrap();
        queue.soft_stop();

        let report = queue.join().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![4]);
        assert_eq!(report.executed, 4);
        assert_eq!(report.failed, 3);
    }

    #[test]
    fn task_added_after_soft_stop_and_join_is_rejected() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();
        queue.soft_stop();
        queue.join().unwrap();

        assert!(matches!(queue.add_task(make(1)), Err(CmdqError::QueueClosed)));
        assert_eq!(queue.pending(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn task_added_after_hard_stop_is_rejected() {
        let (_log, make) = recorder();
        let queue = ConcurrentTaskQueue::new();
        queue.add_task(make(1)).unwrap();
        queue.hard_stop();

        assert!(matches!(queue.add_task(make(2)), Err(CmdqError::QueueClosed)));
        let op = FnOperation::new("MoveCommand", || Ok(()));
        assert!(matches!(queue.add_operation(op), Err(CmdqError::QueueClosed)));
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();
        assert!(matches!(queue.start(), Err(CmdqError::WorkerAlreadyStarted)));
        queue.soft_stop();
        queue.join().unwrap();
    }

    #[test]
    fn join_without_start_is_an_error() {
        let mut queue = ConcurrentTaskQueue::new();
        assert!(matches!(queue.join(), Err(CmdqError::WorkerNotRunning)));
    }

    #[test]
    fn join_twice_is_an_error() {
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();
        queue.soft_stop();
        queue.join().unwrap();
        assert!(matches!(queue.join(), Err(CmdqError::WorkerNotRunning)));
    }

    #[test]
    fn drop_without_stop_does_not_hang() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        queue.start().unwrap();
        queue.add_task(make(1)).unwrap();
        drop(queue);
        assert!(log.lock().unwrap().len() <= 1);
    }

    #[test]
    fn pending_counts_unstarted_tasks() {
        let (_log, make) = recorder();
        let queue = ConcurrentTaskQueue::new();
        queue.add_task(make(1)).unwrap();
        queue.add_task(make(2)).unwrap();
        assert_eq!(queue.pending(), 2);
        assert!(!queue.is_running());
    }

    #[test]
    fn worker_thread_uses_configured_name() {
        let config = EngineConfig {
            worker_thread_name: "ship-worker".to_string(),
            ..EngineConfig::default()
        };
        let (tx, rx) = mpsc::channel();
        let mut queue = ConcurrentTaskQueue::with_config(&config);
        queue.add_task(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
            Ok(())
        })
        .unwrap();
        queue.start().unwrap();
        queue.soft_stop();
        queue.join().unwrap();
        assert_eq!(rx.recv().unwrap().as_deref(), Some("ship-worker"));
    }

    #[tokio::test]
    async fn join_async_waits_for_soft_stop() {
        let (log, make) = recorder();
        let mut queue = ConcurrentTaskQueue::new();
        queue.add_task(make(1)).unwrap();
        queue.add_task(make(2)).unwrap();
        queue.start().unwrap();
        queue.soft_stop();

        let report = queue.join_async().await.unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }
}
