use clap::Parser;
use std::path::PathBuf;

use crate::court_booker::RunOptions;

/// Court Booker - books sports courts for every configured user
#[derive(Debug, Parser)]
#[command(name = "court-booker")]
#[command(about = "Multi-user court booking system", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file with the [USER_LOGIN] / [USER_BOOKING] tables
    #[arg(long, env = "COURT_BOOKER_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Saved search results page to replay
    #[arg(long = "results-page", env = "COURT_BOOKER_RESULTS_PAGE", default_value = "results.html")]
    pub results_page: PathBuf,

    /// Suppress console output below errors
    #[arg(long)]
    pub quiet: bool,

    /// Save a page capture after every step
    #[arg(long)]
    pub screenshots: bool,

    /// Where captures are written
    #[arg(long = "capture-dir", default_value = "screenshots")]
    pub capture_dir: PathBuf,

    /// Where each user's DEBUG log file is written
    #[arg(long = "log-dir", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Book the date from the config instead of six days ahead
    #[arg(long = "use-config-date")]
    pub use_config_date: bool,

    /// Run all users at the same time
    #[arg(long)]
    pub parallel: bool,

    /// Write a JSON status report here after each run
    #[arg(long = "status-file")]
    pub status_file: Option<PathBuf>,

    /// Repeat the run on this cron schedule (sec min hour day month weekday)
    #[arg(long)]
    pub schedule: Option<String>,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            results_page: self.results_page.clone(),
            capture_dir: self.screenshots.then(|| self.capture_dir.clone()),
            log_dir: Some(self.log_dir.clone()),
            quiet: self.quiet,
            use_config_date: self.use_config_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn captures_only_when_screenshots_enabled() {
        let cli = Cli::parse_from(["court-booker", "--config", "c.toml"]);
        assert_eq!(cli.run_options().capture_dir, None);

        let cli = Cli::parse_from(["court-booker", "--screenshots", "--capture-dir", "shots"]);
        assert_eq!(cli.run_options().capture_dir, Some(PathBuf::from("shots")));
    }

    #[test]
    fn per_user_logs_go_to_log_dir() {
        let cli = Cli::parse_from(["court-booker"]);
        assert_eq!(cli.run_options().log_dir, Some(PathBuf::from("logs")));

        let cli = Cli::parse_from(["court-booker", "--quiet", "--log-dir", "audit"]);
        let options = cli.run_options();
        assert_eq!(options.log_dir, Some(PathBuf::from("audit")));
        assert!(options.quiet);
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "court-booker",
            "--parallel",
            "--use-config-date",
            "--status-file",
            "dashboard/status.json",
            "--schedule",
            "0 0 7 * * *",
        ]);

        assert!(cli.parallel);
        assert!(cli.run_options().use_config_date);
        assert_eq!(cli.status_file, Some(PathBuf::from("dashboard/status.json")));
        assert_eq!(cli.schedule.as_deref(), Some("0 0 7 * * *"));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
