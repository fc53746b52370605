//! Offline booking site backed by a saved search results page

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::LoginConfig;
use crate::models::{BookingDetails, Selection};
use crate::traits::BookingSite;

/// Replays a results page captured from the real site.
///
/// Every step is recorded instead of clicked, which makes this the site
/// used for dry runs and for exercising the workflow in tests.
pub struct ReplaySite {
    user: String,
    login: LoginConfig,
    results_path: PathBuf,
    capture_dir: Option<PathBuf>,
    page: Option<String>,
    steps: Vec<String>,
}

impl ReplaySite {
    pub fn new(user: &str, login: LoginConfig, results_path: impl Into<PathBuf>) -> Self {
        Self {
            user: user.to_string(),
            login,
            results_path: results_path.into(),
            capture_dir: None,
            page: None,
            steps: Vec::new(),
        }
    }

    /// Write captures under `dir/{user}/`
    #[must_use]
    pub fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }

    /// Steps performed so far, in order
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    fn record(&mut self, step: String) {
        info!("[replay] {}", step);
        self.steps.push(step);
    }
}

#[async_trait]
impl BookingSite for ReplaySite {
    async fn login(&mut self) -> Result<()> {
        if self.login.username.is_empty() || self.login.password.expose_secret().is_empty() {
            anyhow::bail!("Missing username or password for {}", self.user);
        }
        self.record(format!("login {} at {}", self.login.username, self.login.url));
        Ok(())
    }

    async fn open_facility_search(&mut self) -> Result<()> {
        self.record("open facility search".to_string());
        Ok(())
    }

    async fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        let html = tokio::fs::read_to_string(&self.results_path)
            .await
            .with_context(|| format!("Failed to read results page {}", self.results_path.display()))?;
        self.page = Some(html);
        self.record(format!("select date {}", date.format("%Y-%m-%d")));
        Ok(())
    }

    async fn results_page(&mut self) -> Result<String> {
        self.page
            .clone()
            .context("No search has been run, select a date first")
    }

    async fn choose_slot(&mut self, selection: &Selection<'_>) -> Result<()> {
        self.record(format!(
            "choose block {} slot {} ({} at {})",
            selection.block_index, selection.slot_index, selection.block.title, selection.slot.text
        ));
        Ok(())
    }

    async fn finalize(&mut self, details: &BookingDetails) -> Result<()> {
        self.record(format!("finalize reason='{}'", details.booking_reason));
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.record("logout".to_string());
        Ok(())
    }

    async fn capture(&mut self, name: &str) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.capture_dir else {
            return Ok(None);
        };

        let user_dir = dir.join(&self.user);
        tokio::fs::create_dir_all(&user_dir)
            .await
            .with_context(|| format!("Failed to create capture dir {}", user_dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = user_dir.join(format!("{name}_{timestamp}.html"));
        tokio::fs::write(&path, self.page.as_deref().unwrap_or_default())
            .await
            .with_context(|| format!("Failed to write capture {}", path.display()))?;

        info!("Capture saved: {}", path.display());
        Ok(Some(path))
    }
}
