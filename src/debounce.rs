use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Coalesces rapid submissions into one.
///
/// Every call to [`settle`](Debouncer::settle) starts a new request
/// generation. Only a request that is still the newest once the delay has
/// passed gets a [`Ticket`]; in-flight work is never cancelled, but a ticket
/// tells whether its result has been superseded in the meantime.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

/// Proof that a request survived debouncing.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once a newer request has been submitted.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a request and wait out the delay.
    ///
    /// Returns `None` when another request arrived before the delay elapsed.
    pub async fn settle(&self) -> Option<Ticket> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let ticket = Ticket {
            generation,
            latest: self.latest.clone(),
        };
        if ticket.is_current() {
            Some(ticket)
        } else {
            debug!("Request {} superseded while debouncing", generation);
            None
        }
    }
}
