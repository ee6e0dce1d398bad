//! Background generation with a completion channel and cancellation.
//!
//! A [`GenerationTask`] owns one worker thread running a full
//! [`CurveManager`] pass. The result comes back over a single-slot
//! `crossbeam-channel`; the shared cancel flag is polled by the pass between
//! curve slots. Dropping the task cancels it without waiting for the thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError};
use flow_art_core::{FlowError, Settings};
use flow_art_curves::CurveManager;
use glam::DVec2;

type Outcome = Result<CurveManager, FlowError>;

pub struct GenerationTask {
    cancel: Arc<AtomicBool>,
    rx: Receiver<Outcome>,
    handle: Option<JoinHandle<()>>,
}

impl GenerationTask {
    /// Starts generating on a new thread.
    pub fn spawn(
        width: u32,
        height: u32,
        settings: Settings,
        pointer: Option<DVec2>,
    ) -> Result<Self, FlowError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = crossbeam_channel::bounded(1);
        let flag = Arc::clone(&cancel);

        let handle = thread::Builder::new()
            .name("flow-art-generate".to_owned())
            .spawn(move || {
                let outcome = CurveManager::generate_with(width, height, &settings, pointer, || {
                    !flag.load(Ordering::Relaxed)
                });
                if let Err(e) = &outcome {
                    log::debug!("generation ended early: {e}");
                }
                // The receiver is gone when the task was dropped.
                let _ = tx.send(outcome);
            })
            .map_err(|e| FlowError::TaskFailed(e.to_string()))?;

        Ok(Self {
            cancel,
            rx,
            handle: Some(handle),
        })
    }

    /// Asks the worker to stop at the next curve slot.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("generation thread panicked");
            }
        }
    }

    /// Non-blocking poll: `None` while the worker is still running.
    pub fn try_finish(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.join();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(FlowError::TaskFailed(
                    "generation thread exited without a result".to_owned(),
                )))
            }
        }
    }

    /// Blocks until the worker delivers its result.
    pub fn wait(mut self) -> Outcome {
        let outcome = self.rx.recv().unwrap_or_else(|_| {
            Err(FlowError::TaskFailed(
                "generation thread exited without a result".to_owned(),
            ))
        });
        self.join();
        outcome
    }
}

impl Drop for GenerationTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
