//! The seam between the booking workflow and whatever drives the site

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{BookingDetails, Selection};

/// Page-level steps of the booking site, in the order the workflow calls them
#[async_trait]
pub trait BookingSite: Send + Sync {
    /// Sign in with the user's credentials
    async fn login(&mut self) -> Result<()>;

    /// Open the facility search page
    async fn open_facility_search(&mut self) -> Result<()>;

    /// Pick the booking date and run the search
    async fn select_date(&mut self, date: NaiveDate) -> Result<()>;

    /// HTML of the rendered search results, ready for parsing
    async fn results_page(&mut self) -> Result<String>;

    /// Click the chosen slot inside the chosen result block
    ///
    /// # Arguments
    /// * `selection` - Block and slot positions as they appeared on the page
    async fn choose_slot(&mut self, selection: &Selection<'_>) -> Result<()>;

    /// Add to cart and fill the checkout questions
    async fn finalize(&mut self, details: &BookingDetails) -> Result<()>;

    async fn logout(&mut self) -> Result<()>;

    /// Save an audit capture of the current page
    ///
    /// # Returns
    /// * `Result<Option<PathBuf>>` - Where the capture was written, if anywhere
    async fn capture(&mut self, _name: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}
