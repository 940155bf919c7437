//! Trailing-edge debounce over a rapidly-changing value.

use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};

/// Delays propagation of a changing value until it has been stable for the
/// full delay.
///
/// Pure trailing-edge: every new input cancels the pending emission and
/// restarts the timer, so a burst of changes produces exactly one output
/// once the input settles. An empty/cleared value is debounced like any
/// other; there is no leading-edge short-circuit. When an input lands at the
/// exact instant the timer expires, the newer input wins.
pub struct Debouncer<T> {
    input: watch::Sender<T>,
    output: watch::Receiver<T>,
    worker: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input_tx, mut input_rx) = watch::channel(initial.clone());
        let (output_tx, output_rx) = watch::channel(initial);

        let worker = tokio::spawn(async move {
            while input_rx.changed().await.is_ok() {
                loop {
                    let candidate = input_rx.borrow_and_update().clone();
                    let timer = tokio::time::sleep(delay);
                    tokio::pin!(timer);
                    tokio::select! {
                        // Input changes win ties against timer expiry.
                        biased;
                        changed = input_rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                        () = &mut timer => {
                            let _ = output_tx.send(candidate);
                            break;
                        }
                    }
                }
            }
        });

        Self {
            input: input_tx,
            output: output_rx,
            worker,
        }
    }

    /// Records a new input value; the debounced output updates only once the
    /// input has been stable for the full delay.
    pub fn set(&self, value: T) {
        let _ = self.input.send(value);
    }

    /// Channel carrying the debounced (trailing) value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.clone()
    }

    /// Latest debounced value.
    pub fn current(&self) -> T {
        self.output.borrow().clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
