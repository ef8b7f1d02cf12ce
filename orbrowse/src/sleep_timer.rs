//! Sleep timer
//!
//! A single countdown at a time: starting the timer again replaces the
//! running countdown. On expiry the callback runs once.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Running {
    token: CancellationToken,
    deadline: Instant,
    generation: u64,
}

#[derive(Default)]
struct TimerState {
    running: Option<Running>,
    generation: u64,
}

/// Countdown that fires a callback once
///
/// Must be started from within a tokio runtime.
#[derive(Clone)]
pub struct SleepTimer {
    state: Arc<Mutex<TimerState>>,
    on_expired: Callback,
}

impl SleepTimer {
    pub fn new(on_expired: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::default())),
            on_expired: Arc::new(on_expired),
        }
    }

    /// Start a countdown of `duration`, cancelling any running one
    pub fn start(&self, duration: Duration) {
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.state.lock().unwrap();
            if let Some(previous) = state.running.take() {
                previous.token.cancel();
            }
            state.generation += 1;
            state.running = Some(Running {
                token: token.clone(),
                deadline: Instant::now() + duration,
                generation: state.generation,
            });
            state.generation
        };
        tracing::info!(minutes = duration.as_secs() / 60, "Sleep timer started");

        let state = self.state.clone();
        let on_expired = self.on_expired.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    let fire = {
                        let mut state = state.lock().unwrap();
                        let current = state
                            .running
                            .as_ref()
                            .is_some_and(|r| r.generation == generation);
                        if current {
                            state.running = None;
                        }
                        current
                    };
                    if fire {
                        on_expired();
                    }
                }
            }
        });
    }

    /// Stop the running countdown, returns `false` when none was running
    pub fn cancel(&self) -> bool {
        let running = self.state.lock().unwrap().running.take();
        match running {
            Some(running) => {
                running.token.cancel();
                tracing::info!("Sleep timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().running.is_some()
    }

    /// Time left before expiry
    pub fn remaining(&self) -> Option<Duration> {
        self.state
            .lock()
            .unwrap()
            .running
            .as_ref()
            .map(|r| r.deadline.saturating_duration_since(Instant::now()))
    }
}
