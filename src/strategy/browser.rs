use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use super::direct::random_user_agent;
use super::ExtractionStrategy;
use crate::errors::ScrapeFailure;

// Time for client-side rendering after the load event.
const SETTLE: Duration = Duration::from_millis(1500);
// Left for Chrome to shut down before the orchestrator's own deadline.
const SHUTDOWN_MARGIN: Duration = Duration::from_millis(500);

/// Wall-clock budget shared by every step of one session.
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn for_session(timeout: Duration) -> Self {
        Self::starting(Instant::now(), timeout)
    }

    fn starting(now: Instant, timeout: Duration) -> Self {
        let budget = timeout.saturating_sub(SHUTDOWN_MARGIN);
        Self {
            at: now + budget,
            budget,
        }
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.at.saturating_duration_since(now)
    }

    /// Time left for the next step, or a timeout once the budget is spent.
    fn step_at(&self, now: Instant) -> Result<Duration, ScrapeFailure> {
        match self.remaining_at(now) {
            d if d.is_zero() => Err(ScrapeFailure::Timeout(self.budget)),
            d => Ok(d),
        }
    }

    fn step(&self) -> Result<Duration, ScrapeFailure> {
        self.step_at(Instant::now())
    }

    /// Settling never eats into the time needed to read the page back.
    fn settle_at(&self, now: Instant) -> Duration {
        SETTLE.min(self.remaining_at(now) / 2)
    }
}

/// Headless Chrome session for pages that render client-side.
///
/// Each fetch launches its own browser; nothing is shared between calls.
pub struct BrowserStrategy {
    timeout: Duration,
}

impl BrowserStrategy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn browser_failure(stage: &str, e: impl std::fmt::Display) -> ScrapeFailure {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        ScrapeFailure::Network(format!("{}: {}", stage, msg))
    } else if lower.contains("net::err") {
        ScrapeFailure::Network(format!("connection failed during {}: {}", stage, msg))
    } else {
        ScrapeFailure::Browser(format!("{}: {}", stage, msg))
    }
}

fn render(url: &str, timeout: Duration) -> Result<String, ScrapeFailure> {
    let deadline = Deadline::for_session(timeout);
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(deadline.step()?)
        .build()
        .map_err(|e| browser_failure("launch options", e))?;

    let browser = Browser::new(options).map_err(|e| browser_failure("launch", e))?;
    let tab = browser.new_tab().map_err(|e| browser_failure("new tab", e))?;
    tab.set_user_agent(random_user_agent(), Some("pt-PT,pt;q=0.9,en;q=0.8"), None)
        .map_err(|e| browser_failure("user agent", e))?;

    tab.set_default_timeout(deadline.step()?);
    tab.navigate_to(url).map_err(|e| browser_failure("navigate", e))?;
    tab.set_default_timeout(deadline.step()?);
    tab.wait_until_navigated()
        .map_err(|e| browser_failure("navigation", e))?;

    let settle = deadline.settle_at(Instant::now());
    if !settle.is_zero() {
        std::thread::sleep(settle);
    }

    tab.set_default_timeout(deadline.step()?);
    tab.get_content().map_err(|e| browser_failure("read content", e))
}

#[async_trait]
impl ExtractionStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapeFailure> {
        let url = url.to_string();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || render(&url, timeout))
            .await
            .map_err(|e| ScrapeFailure::Browser(format!("session task aborted: {}", e)))?
    }
}

// ── Tests ──
