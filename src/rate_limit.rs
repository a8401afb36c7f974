//! Process-wide request quota.
//!
//! Every request counts against the same set of fixed windows (for example
//! 100 per minute, 1000 per hour and 5000 per day). There is no per-client
//! key. A request is admitted only when every window still has room, and
//! admission increments all of them at once.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::AppError;

/// One `N per unit` quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: u32,
    pub period: Duration,
}

impl RateLimitRule {
    pub fn new(limit: u32, period: Duration) -> Self {
        Self { limit, period }
    }

    /// Parses `100 per minute`, `1000/hour` or `5000 per days`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let (count, unit) = text
            .split_once(" per ")
            .or_else(|| text.split_once('/'))
            .ok_or_else(|| format!("expected '<count> per <unit>', got '{}'", text))?;

        let limit: u32 = count
            .trim()
            .parse()
            .map_err(|_| format!("invalid request count '{}'", count.trim()))?;
        if limit == 0 {
            return Err("request count must be greater than zero".into());
        }

        let seconds = match unit.trim().trim_end_matches('s') {
            "second" => 1,
            "minute" => 60,
            "hour" => 60 * 60,
            "day" => 60 * 60 * 24,
            other => return Err(format!("unknown time unit '{}'", other)),
        };

        Ok(Self::new(limit, Duration::from_secs(seconds)))
    }

    /// Parses a `;` or `,` separated list of rules. An empty string yields no rules.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, String> {
        text.split([';', ','])
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for RateLimitRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let unit = match self.period.as_secs() {
            1 => "second",
            60 => "minute",
            3600 => "hour",
            86400 => "day",
            _ => return write!(f, "{} per {}s", self.limit, self.period.as_secs()),
        };
        write!(f, "{} per {}", self.limit, unit)
    }
}

#[derive(Debug)]
struct Window {
    rule: RateLimitRule,
    started: Instant,
    count: u32,
}

/// Fixed-window counters shared by every worker.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<Vec<Window>>,
}

impl RateLimiter {
    pub fn new(rules: Vec<RateLimitRule>) -> Self {
        let now = Instant::now();
        let windows = rules
            .into_iter()
            .map(|rule| Window {
                rule,
                started: now,
                count: 0,
            })
            .collect();
        Self {
            windows: Mutex::new(windows),
        }
    }

    /// A limiter with no rules admits everything.
    pub fn unlimited() -> Self {
        Self::new(Vec::new())
    }

    pub fn check(&self) -> Result<(), AppError> {
        self.check_at(Instant::now())
    }

    pub fn check_at(&self, now: Instant) -> Result<(), AppError> {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for window in windows.iter_mut() {
            if now.saturating_duration_since(window.started) >= window.rule.period {
                window.started = now;
                window.count = 0;
            }
        }

        if let Some(full) = windows.iter().find(|w| w.count >= w.rule.limit) {
            let elapsed = now.saturating_duration_since(full.started);
            let retry_after = full.rule.period.saturating_sub(elapsed).as_secs().max(1);
            log::warn!("rate limit exceeded: {}", full.rule);
            return Err(AppError::RateLimited {
                message: format!("Rate limit exceeded: {}", full.rule),
                retry_after,
            });
        }

        for window in windows.iter_mut() {
            window.count += 1;
        }
        Ok(())
    }
}

/// Middleware applying a shared [`RateLimiter`] to every request.
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(app_err) = self.limiter.check() {
            log::debug!("rejected {} {}", req.method(), req.path());
            let response = app_err.error_response().map_into_right_body();
            return Box::pin(ready(Ok(req.into_response(response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
