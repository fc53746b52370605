//! Multi-user booking configuration
//!
//! Each user prefix `P` needs a `[P_LOGIN]` and a `[P_BOOKING]` table:
//!
//! ```toml
//! [USER1_LOGIN]
//! url = "https://reservations.example.org/login"
//! username = "alex"
//! password = "hunter2"
//!
//! [USER1_BOOKING]
//! facility = "Badminton"
//! time = "6:00pm"
//! court_number = 1
//! date = "2026-10-24"
//! cell_number = "555-0100"
//! booking_reason = "League practice"
//! ```
//!
//! Optional `[scoring]` and `[selectors]` tables override the score table
//! and the result page selectors.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::America::St_Johns;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::{error, warn};

use crate::matcher::{is_ambiguous, parse_time};
use crate::models::{BookingDetails, BookingOutcome, DesiredBooking};
use crate::scraper::ResultSelectors;
use crate::selector::ScoreTable;

const LOGIN_SUFFIX: &str = "_LOGIN";
const BOOKING_SUFFIX: &str = "_BOOKING";

/// Days ahead of today (site-local) that the booking window opens
pub const BOOKING_LEAD_DAYS: i64 = 6;

#[derive(Deserialize)]
pub struct LoginConfig {
    pub url: String,
    pub username: String,
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Clone for LoginConfig {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingConfig {
    pub facility: String,
    pub time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub court_number: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub cell_number: String,
    #[serde(default)]
    pub booking_reason: String,
}

#[derive(Debug, Clone)]
pub struct UserConfig {
    pub prefix: String,
    pub login: LoginConfig,
    pub booking: BookingConfig,
}

impl UserConfig {
    /// The attempt's target, with the facility keyword lower-cased.
    ///
    /// # Errors
    ///
    /// Fails for an empty facility or an unparsable time.
    pub fn desired_booking(&self) -> Result<DesiredBooking> {
        let facility = self.booking.facility.trim();
        if facility.is_empty() {
            anyhow::bail!("Booking facility for {} is empty", self.prefix);
        }
        parse_time(&self.booking.time)?;

        Ok(DesiredBooking::new(
            facility,
            self.booking.court_number.as_deref(),
            &self.booking.time,
        ))
    }

    pub fn details(&self) -> BookingDetails {
        BookingDetails {
            cell_number: self.booking.cell_number.clone(),
            booking_reason: self.booking.booking_reason.clone(),
        }
    }

    /// Date to book: the configured one, or six days after today in
    /// St. John's time.
    ///
    /// # Errors
    ///
    /// Fails when `use_config_date` is set but no date is configured.
    pub fn booking_date(&self, now: DateTime<Utc>, use_config_date: bool) -> Result<NaiveDate> {
        if use_config_date {
            return self
                .booking
                .date
                .with_context(|| format!("No date configured in [{}{}]", self.prefix, BOOKING_SUFFIX));
        }

        Ok(now.with_timezone(&St_Johns).date_naive() + Duration::days(BOOKING_LEAD_DAYS))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub users: Vec<UserConfig>,
    /// Users whose tables could not be read; they fail without running
    pub rejected: Vec<RejectedUser>,
    pub scoring: ScoreTable,
    pub selectors: ResultSelectors,
}

/// A user prefix whose login or booking table is invalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUser {
    pub prefix: String,
    pub reason: String,
}

impl RejectedUser {
    pub fn outcome(&self) -> BookingOutcome {
        BookingOutcome::failed(&self.prefix, &anyhow::anyhow!("{}", self.reason))
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;

        let scoring = match table.get("scoring") {
            Some(value) => value.clone().try_into().context("Invalid [scoring] table")?,
            None => ScoreTable::default(),
        };
        let selectors = match table.get("selectors") {
            Some(value) => value.clone().try_into().context("Invalid [selectors] table")?,
            None => ResultSelectors::default(),
        };

        let mut users = Vec::new();
        let mut rejected = Vec::new();
        for prefix in valid_users(&table) {
            match read_user(&table, &prefix) {
                Ok(user) => {
                    if let Err(e) = parse_time(&user.booking.time) {
                        error!("{}: {}", prefix, e);
                    } else if is_ambiguous(&user.booking.time) {
                        warn!(
                            "{}: time '{}' has no am/pm and will be read as 24-hour",
                            prefix, user.booking.time
                        );
                    }
                    users.push(user);
                }
                Err(e) => {
                    error!("{}: {:#}", prefix, e);
                    rejected.push(RejectedUser {
                        prefix,
                        reason: format!("{e:#}"),
                    });
                }
            }
        }

        Ok(Self {
            users,
            rejected,
            scoring,
            selectors,
        })
    }
}

fn read_user(table: &toml::Table, prefix: &str) -> Result<UserConfig> {
    let section = |suffix: &str| -> Result<toml::Value> {
        table
            .get(&format!("{prefix}{suffix}"))
            .cloned()
            .with_context(|| format!("Missing [{prefix}{suffix}] table"))
    };

    let login: LoginConfig = section(LOGIN_SUFFIX)?
        .try_into()
        .with_context(|| format!("Invalid [{prefix}{LOGIN_SUFFIX}] table"))?;
    let booking: BookingConfig = section(BOOKING_SUFFIX)?
        .try_into()
        .with_context(|| format!("Invalid [{prefix}{BOOKING_SUFFIX}] table"))?;

    Ok(UserConfig {
        prefix: prefix.to_string(),
        login,
        booking,
    })
}

/// User prefixes with both a login and a booking table, sorted by name
pub fn valid_users(table: &toml::Table) -> Vec<String> {
    table
        .keys()
        .filter_map(|section| section.strip_suffix(LOGIN_SUFFIX))
        .filter(|prefix| table.contains_key(&format!("{prefix}{BOOKING_SUFFIX}")))
        .map(ToString::to_string)
        .collect()
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Raw::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
