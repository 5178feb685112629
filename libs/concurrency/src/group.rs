//! Fan-out of independent async tasks joined by a barrier, based on Golang errgroup
//! (https://pkg.go.dev/golang.org/x/sync/errgroup) used WITHOUT a derived context.
//!
//! `Group::wait()` returns only after every spawned task has completed. If any task fails,
//! the error of the task which failed first (in completion order) is reported, but the
//! remaining tasks are NOT canceled: they keep running until they complete on their own,
//! and their side effects persist. This is deliberately different from a structured
//! concurrency scope, which cancels siblings as soon as one of them fails.
//!
//! Each task owns whatever it needs (`'static` futures). Values produced by the tasks are
//! returned in spawn order, so the caller can match outputs back to the inputs they were
//! spawned for, including the outputs of tasks which succeeded next to a failing one.
//!
//! Dropping a `Group` before `wait()` detaches its tasks rather than aborting them.
use std::future::Future;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::Instrument as _;

/// Group of concurrently running tasks, each producing `anyhow::Result<T>`.
pub struct Group<T> {
    handles: Vec<JoinHandle<()>>,
    done_send: mpsc::UnboundedSender<(usize, anyhow::Result<T>)>,
    done_recv: mpsc::UnboundedReceiver<(usize, anyhow::Result<T>)>,
}

impl<T> std::fmt::Debug for Group<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("spawned", &self.handles.len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static + Send> Default for Group<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static + Send> Group<T> {
    /// Constructs an empty group.
    pub fn new() -> Self {
        let (done_send, done_recv) = mpsc::unbounded_channel();
        Self {
            handles: vec![],
            done_send,
            done_recv,
        }
    }

    /// Spawns a task in the group. The task starts running immediately on the tokio runtime.
    /// Returns the index under which its output will be reported by `wait()`.
    pub fn spawn<F>(&mut self, task: F) -> usize
    where
        F: 'static + Send + Future<Output = anyhow::Result<T>>,
    {
        let index = self.handles.len();
        let done = self.done_send.clone();
        self.handles.push(tokio::spawn(
            async move {
                // Fails only if the group was dropped without waiting.
                let _ = done.send((index, task.await));
            }
            .in_current_span(),
        ));
        index
    }

    /// Number of tasks spawned so far.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Awaits completion of ALL the tasks in the group.
    /// Panics if any of the tasks panicked.
    pub async fn wait(self) -> Joined<T> {
        let Self {
            handles,
            done_send,
            mut done_recv,
        } = self;
        drop(done_send);
        let mut outputs: Vec<Option<anyhow::Result<T>>> =
            (0..handles.len()).map(|_| None).collect();
        let mut first_failed = None;
        // Completes once every task has either reported or dropped its sender.
        while let Some((index, output)) = done_recv.recv().await {
            if output.is_err() && first_failed.is_none() {
                first_failed = Some(index);
            }
            outputs[index] = Some(output);
        }
        for handle in handles {
            match handle.await {
                Ok(()) => {}
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                // Only happens when the runtime is shutting down. The slot stays empty and
                // is reported below.
                Err(_) => {}
            }
        }
        let outputs: Vec<anyhow::Result<T>> = outputs
            .into_iter()
            .enumerate()
            .map(|(i, output)| {
                output.unwrap_or_else(|| Err(anyhow::format_err!("task {i} was canceled")))
            })
            .collect();
        if first_failed.is_none() {
            first_failed = outputs.iter().position(Result::is_err);
        }
        Joined {
            outputs,
            first_failed,
        }
    }
}

/// Outputs of all tasks of a `Group`, in spawn order.
#[derive(Debug)]
pub struct Joined<T> {
    outputs: Vec<anyhow::Result<T>>,
    first_failed: Option<usize>,
}

impl<T> Joined<T> {
    /// Index of the task which failed first, if any did.
    pub fn first_failed(&self) -> Option<usize> {
        self.first_failed
    }

    /// Number of tasks which completed successfully.
    pub fn succeeded(&self) -> usize {
        self.outputs.iter().filter(|o| o.is_ok()).count()
    }

    /// Splits the outputs into the values of the successful tasks (`None` for the failed ones)
    /// and the error of the task which failed first.
    pub fn into_parts(self) -> (Vec<Option<T>>, Option<anyhow::Error>) {
        let mut first_err = None;
        let values = self
            .outputs
            .into_iter()
            .enumerate()
            .map(|(i, output)| match output {
                Ok(v) => Some(v),
                Err(err) => {
                    if Some(i) == self.first_failed {
                        first_err = Some(err);
                    }
                    None
                }
            })
            .collect();
        (values, first_err)
    }

    /// Returns all the values, or the error of the task which failed first.
    pub fn into_result(self) -> anyhow::Result<Vec<T>> {
        match self.into_parts() {
            (_, Some(err)) => Err(err),
            (values, None) => Ok(values.into_iter().flatten().collect()),
        }
    }
}
