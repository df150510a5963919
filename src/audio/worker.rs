use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::audio::{AudioBackend, AudioCue, CancelCheck, play_chain};

struct Job {
    id: u64,
    epoch: u64,
    cues: Vec<AudioCue>,
}

struct EpochCancel {
    epoch: u64,
    current: Arc<AtomicU64>,
}

impl CancelCheck for EpochCancel {
    fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.epoch
    }
}

/// Runs audio chains on a background thread so the UI keeps drawing while a
/// word is spoken. Every chain reports completion through `on_done`, also when
/// some of its cues failed or it was cancelled.
pub struct AudioWorker {
    tx: mpsc::Sender<Job>,
    epoch: Arc<AtomicU64>,
    next_id: u64,
}

impl AudioWorker {
    pub fn spawn<F>(mut backend: Box<dyn AudioBackend>, on_done: F) -> Self
    where
        F: Fn(u64) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job>();
        let epoch = Arc::new(AtomicU64::new(0));
        let current = Arc::clone(&epoch);

        thread::spawn(move || {
            for job in rx {
                let cancel = EpochCancel {
                    epoch: job.epoch,
                    current: Arc::clone(&current),
                };
                if !cancel.is_cancelled() {
                    let failures = play_chain(backend.as_mut(), &job.cues, &cancel);
                    if failures > 0 {
                        log::debug!("audio chain {} finished with {failures} failure(s)", job.id);
                    }
                }
                on_done(job.id);
            }
        });

        Self {
            tx,
            epoch,
            next_id: 1,
        }
    }

    /// Queues a chain and returns its id.
    pub fn play(&mut self, cues: Vec<AudioCue>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let job = Job {
            id,
            epoch: self.epoch.load(Ordering::SeqCst),
            cues,
        };
        if self.tx.send(job).is_err() {
            log::warn!("audio thread is gone; dropping chain {id}");
        }
        id
    }

    /// Stops whatever is playing and skips every chain queued so far.
    pub fn cancel_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}
