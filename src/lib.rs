//! Court reservation automation: matches scraped result blocks to a
//! desired facility, court and one-hour slot, then drives the booking
//! site through checkout for each configured user.

pub mod cli;
pub mod config;
pub mod court_booker;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod report;
pub mod scraper;
pub mod selector;
pub mod sites;
pub mod traits;

pub use error::BookingError;
