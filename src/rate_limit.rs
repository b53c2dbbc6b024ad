//! Sliding-window rate limiter with punitive blocking (§4.2).
//!
//! One coarse `Mutex` guards the whole client table, same as
//! `agentsh::registry::ProcessRegistry` guards its process table -- the
//! critical section here is O(1) amortized (pruning is bounded by
//! `max_requests`), so a single lock beats the complexity of sharding.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const BLOCK_DURATION: Duration = Duration::from_secs(60 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const SWEEP_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct ClientRecord {
    requests: Vec<Instant>,
    blocked: bool,
    block_expiry: Option<Instant>,
}

impl ClientRecord {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            blocked: false,
            block_expiry: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOutcome {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Duration,
}

/// Thread-safe sliding-window rate limiter store, keyed by client IP.
#[derive(Clone)]
pub struct RateLimiterStore {
    clients: Arc<Mutex<HashMap<String, ClientRecord>>>,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RateLimiterStore {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the periodic sweeper (§4.2). Idempotent: calling it twice
    /// aborts the previous task first.
    pub async fn spawn_sweeper(&self) {
        let clients = self.clients.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let now = Instant::now();
                let mut guard = clients.lock().await;
                guard.retain(|_id, record| {
                    if record.blocked {
                        return true;
                    }
                    match record.requests.last() {
                        None => false,
                        Some(&newest) => now.duration_since(newest) < SWEEP_STALE_AFTER,
                    }
                });
            }
        });
        let mut slot = self.sweeper.lock().await;
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    pub async fn destroy(&self) {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
        }
    }

    /// `checkLimit(clientId, maxRequests, windowMs)` (§4.2 algorithm).
    pub async fn check_limit(
        &self,
        client_id: &str,
        max_requests: u32,
        window: Duration,
    ) -> LimitOutcome {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        let record = clients
            .entry(client_id.to_string())
            .or_insert_with(ClientRecord::new);

        if record.blocked {
            if let Some(expiry) = record.block_expiry {
                if now < expiry {
                    return LimitOutcome {
                        allowed: false,
                        remaining: 0,
                        retry_after: expiry - now,
                    };
                }
            }
            record.blocked = false;
            record.block_expiry = None;
        }

        record
            .requests
            .retain(|&ts| now.duration_since(ts) < window);

        if record.requests.len() as u32 >= max_requests {
            record.blocked = true;
            record.block_expiry = Some(now + BLOCK_DURATION);
            return LimitOutcome {
                allowed: false,
                remaining: 0,
                retry_after: BLOCK_DURATION,
            };
        }

        record.requests.push(now);
        let remaining = max_requests.saturating_sub(record.requests.len() as u32);
        LimitOutcome {
            allowed: true,
            remaining,
            retry_after: Duration::ZERO,
        }
    }
}

impl Default for RateLimiterStore {
    fn default() -> Self {
        Self::new()
    }
}
