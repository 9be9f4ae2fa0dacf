//! Per-client request limits.
//!
//! Each client IP gets an hourly and a daily fixed window. A request is
//! admitted only when both windows have room; rejected requests do not count.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::AppError;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Tracked clients above which expired entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }

    /// Start a fresh window if `length` has elapsed.
    fn roll(&mut self, now: Instant, length: Duration) {
        if now.duration_since(self.started) >= length {
            *self = Window::new(now);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindows {
    hourly: Window,
    daily: Window,
}

#[derive(Debug)]
pub struct RateLimiter {
    hourly_limit: u32,
    daily_limit: u32,
    clients: Mutex<HashMap<IpAddr, ClientWindows>>,
}

pub type SharedRateLimiter = Arc<RateLimiter>;

impl RateLimiter {
    pub fn new(hourly_limit: u32, daily_limit: u32) -> Self {
        Self {
            hourly_limit,
            daily_limit,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Admit one request from `ip` now.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if clients.len() > PRUNE_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.daily.started) < DAY);
        }

        let windows = clients.entry(ip).or_insert_with(|| ClientWindows {
            hourly: Window::new(now),
            daily: Window::new(now),
        });
        windows.hourly.roll(now, HOUR);
        windows.daily.roll(now, DAY);

        if windows.hourly.count >= self.hourly_limit || windows.daily.count >= self.daily_limit {
            return false;
        }
        windows.hourly.count += 1;
        windows.daily.count += 1;
        true
    }
}

/// axum middleware rejecting clients over their limits with 429.
pub async fn enforce(
    State(limiter): State<SharedRateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !limiter.check(addr.ip()) {
        tracing::warn!("Rate limit exceeded for {}", addr.ip());
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}
