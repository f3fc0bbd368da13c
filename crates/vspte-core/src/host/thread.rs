//! Dedicated host thread with a blocking hand-off.
//!
//! The state (transport plus extractor) is built on the worker by a factory and
//! never leaves it, so it does not need to be `Send`. Callers submit closures
//! and block until the worker has run them.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::retry::HostError;

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

pub struct HostThread<S> {
    tx: Option<mpsc::Sender<Job<S>>>,
    handle: Option<JoinHandle<()>>,
}

impl<S: 'static> HostThread<S> {
    /// Start the worker thread and build its state with `factory` on it.
    pub fn spawn<F>(name: &str, factory: F) -> Result<Self, HostError>
    where
        F: FnOnce() -> S + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job<S>>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut state = factory();
                while let Ok(job) = rx.recv() {
                    job(&mut state);
                }
                tracing::debug!("host thread exiting");
            })
            .map_err(|e| HostError::Session(format!("failed to spawn host thread: {}", e)))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Run `f` on the host thread and block until it returns.
    pub fn run<T, F>(&self, f: F) -> Result<T, HostError>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let tx = self.tx.as_ref().ok_or(HostError::Disconnected)?;
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let job: Job<S> = Box::new(move |state| {
            let _ = reply_tx.send(f(state));
        });
        tx.send(job).map_err(|_| HostError::Disconnected)?;
        // A panicking job drops the reply sender without answering.
        reply_rx.recv().map_err(|_| HostError::Disconnected)
    }

    /// Stop accepting work, let queued jobs finish, and drop the state on the worker.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("host thread panicked");
            }
        }
    }
}

impl<S> Drop for HostThread<S> {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
