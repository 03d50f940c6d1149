//! Per-IP submission throttle for the public contact form.

use std::{
    collections::{HashMap, VecDeque},
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

const WINDOW: Duration = Duration::from_secs(60 * 60);

/// Sliding-window limiter: at most `max_per_window` accepted hits per IP per hour.
/// A limit of zero disables throttling.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    hits: Arc<RwLock<HashMap<IpAddr, VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            window: WINDOW,
            hits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now()).await
    }

    /// Record a hit at `now` and report whether it is allowed.
    pub async fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        if self.max_per_window == 0 {
            return true;
        }

        let window = self.window;
        let mut hits = self.hits.write().await;

        // Drop expired timestamps and forget idle IPs so the map tracks only active clients.
        hits.retain(|_, times| {
            while times
                .front()
                .is_some_and(|t| now.saturating_duration_since(*t) >= window)
            {
                times.pop_front();
            }
            !times.is_empty()
        });

        let times = hits.entry(ip).or_default();
        if times.len() >= self.max_per_window as usize {
            return false;
        }
        times.push_back(now);
        true
    }

    pub async fn tracked_ips(&self) -> usize {
        self.hits.read().await.len()
    }
}
