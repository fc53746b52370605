use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::{Config, UserConfig};
use crate::error::BookingError;
use crate::logging::attempt_dispatch;
use crate::matcher::TimeSlotMatcher;
use crate::models::{BookingDetails, BookingOutcome, DesiredBooking};
use crate::scraper::{ResultSelectors, parse_results};
use crate::selector::CourtSelector;
use crate::sites::ReplaySite;
use crate::traits::BookingSite;

/// Per-attempt state that used to live in a shared logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptContext {
    pub user: String,
    pub date: NaiveDate,
    /// Save a capture after each step
    pub capture: bool,
}

/// Run-wide switches from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub results_page: PathBuf,
    pub capture_dir: Option<PathBuf>,
    /// Per-user log files are written here when set
    pub log_dir: Option<PathBuf>,
    pub quiet: bool,
    pub use_config_date: bool,
}

/// Drives one user's booking through the site's page sequence
pub struct CourtBooker<S: BookingSite> {
    site: S,
    context: AttemptContext,
    desired: DesiredBooking,
    details: BookingDetails,
    selector: CourtSelector,
    result_selectors: ResultSelectors,
    logged_in: bool,
}

impl<S: BookingSite> CourtBooker<S> {
    pub fn new(site: S, context: AttemptContext, desired: DesiredBooking, details: BookingDetails) -> Self {
        Self {
            site,
            context,
            desired,
            details,
            selector: CourtSelector::default(),
            result_selectors: ResultSelectors::default(),
            logged_in: false,
        }
    }

    #[must_use]
    pub fn with_selector(mut self, selector: CourtSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_result_selectors(mut self, result_selectors: ResultSelectors) -> Self {
        self.result_selectors = result_selectors;
        self
    }

    pub fn site(&self) -> &S {
        &self.site
    }

    /// Runs every step, logging out afterwards whenever login succeeded.
    /// Failures end up in the returned outcome rather than an `Err`.
    pub async fn execute_booking(&mut self) -> BookingOutcome {
        let span = info_span!("booking", user = %self.context.user);

        async {
            let result = self.run_steps().await;

            if self.logged_in {
                match self.site.logout().await {
                    Ok(()) => {
                        self.logged_in = false;
                        info!("Logged out");
                    }
                    Err(e) => error!("Logout failed: {:#}", e),
                }
            }

            match result {
                Ok((court, slot)) => {
                    info!("{} at {} selected and added to cart successfully", court, slot);
                    BookingOutcome::succeeded(&self.context.user, &court, &slot)
                }
                Err(e) => {
                    error!("Booking failed for {}: {:#}", self.context.user, e);
                    BookingOutcome::failed(&self.context.user, &e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_steps(&mut self) -> Result<(String, String)> {
        self.site.login().await.context("Login failed")?;
        self.logged_in = true;
        info!("Login successful");
        self.capture("login").await;

        self.site
            .open_facility_search()
            .await
            .context("Failed to navigate to booking page")?;
        info!("Booking page loaded");
        self.capture("facility_search").await;

        let date = self.context.date;
        info!("Selecting date: {}", date);
        self.site
            .select_date(date)
            .await
            .with_context(|| format!("Failed to select date {date}"))?;
        self.capture("date_selected").await;

        let matcher = TimeSlotMatcher::new(&self.desired.time)?;
        let window = matcher.window();
        info!(
            "Looking for {} court (preferred court #{}) at {}, matching {}",
            self.desired.facility_type,
            self.desired.court_number.as_deref().unwrap_or("any"),
            window.start_display(),
            window
        );
        let html = self.site.results_page().await?;
        let blocks = parse_results(&html, &self.result_selectors)?;

        let ranked = self.selector.rank(&blocks, &self.desired)?;
        for candidate in &ranked {
            info!(
                "Found candidate court: {} (Score: {}) with {} matching slots",
                candidate.block.title,
                candidate.score,
                candidate.matching_slots.len()
            );
        }

        let selection = match CourtSelector::choose(&ranked, &self.desired) {
            Ok(selection) => selection,
            Err(e @ BookingError::NoAvailableCourt { .. }) => {
                error!(
                    "No {} courts found with available slots matching {}",
                    self.desired.facility_type,
                    window.start_display()
                );
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            "Selected best matching court: {} (Score: {})",
            selection.block.title, selection.score
        );
        info!("Clicking on time slot: {}", selection.slot.text);

        self.site
            .choose_slot(&selection)
            .await
            .context("Failed to select court and time")?;
        self.capture("slot_selected").await;

        self.site
            .finalize(&self.details)
            .await
            .context("Failed to finalize booking")?;
        info!("Booking finalized successfully");
        self.capture("finalized").await;

        Ok((selection.block.title.clone(), selection.slot.text.clone()))
    }

    async fn capture(&mut self, name: &str) {
        if !self.context.capture {
            return;
        }
        if let Err(e) = self.site.capture(name).await {
            warn!("Capture '{}' failed: {:#}", name, e);
        }
    }
}

/// Builds and runs the attempt for one configured user, logging into
/// the user's own file when `options.log_dir` is set.
///
/// An invalid time, facility or date aborts only this user.
pub async fn book_user(user: &UserConfig, config: &Config, options: &RunOptions) -> BookingOutcome {
    let Some(log_dir) = &options.log_dir else {
        return run_user(user, config, options).await;
    };

    match attempt_dispatch(&user.prefix, log_dir, options.quiet) {
        Ok(dispatch) => run_user(user, config, options).with_subscriber(dispatch).await,
        Err(e) => {
            error!("Per-user log unavailable for {}: {:#}", user.prefix, e);
            run_user(user, config, options).await
        }
    }
}

async fn run_user(user: &UserConfig, config: &Config, options: &RunOptions) -> BookingOutcome {
    let prepared = user.desired_booking().and_then(|desired| {
        let date = user.booking_date(Utc::now(), options.use_config_date)?;
        Ok((desired, date))
    });
    let (desired, date) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("Booking aborted for {}: {:#}", user.prefix, e);
            return BookingOutcome::failed(&user.prefix, &e);
        }
    };

    let mut site = ReplaySite::new(&user.prefix, user.login.clone(), &options.results_page);
    if let Some(dir) = &options.capture_dir {
        site = site.with_capture_dir(dir);
    }

    let context = AttemptContext {
        user: user.prefix.clone(),
        date,
        capture: options.capture_dir.is_some(),
    };

    CourtBooker::new(site, context, desired, user.details())
        .with_selector(CourtSelector::new(config.scoring.clone()))
        .with_result_selectors(config.selectors.clone())
        .execute_booking()
        .await
}
