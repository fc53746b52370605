use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use court_booker::cli::Cli;
use court_booker::config::{Config, RejectedUser};
use court_booker::court_booker::{RunOptions, book_user};
use court_booker::models::BookingOutcome;
use court_booker::{logging, report};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging::init_console(cli.quiet);

    let config = Config::load(&cli.config)?;
    if config.users.is_empty() && config.rejected.is_empty() {
        error!("No valid user configurations found in {}", cli.config.display());
        return Ok(());
    }

    let config = Arc::new(config);
    let options = Arc::new(cli.run_options());
    let settings = Arc::new(cli);

    run_once(&config, &options, &settings).await;

    let Some(schedule) = settings.schedule.clone() else {
        return Ok(());
    };

    let sched = JobScheduler::new().await?;
    sched
        .add(Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let config = Arc::clone(&config);
            let options = Arc::clone(&options);
            let settings = Arc::clone(&settings);
            Box::pin(async move {
                run_once(&config, &options, &settings).await;
            })
        })?)
        .await?;

    info!("Scheduler started with schedule '{}'", schedule);
    sched.start().await?;

    // Keep the program running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}

async fn run_once(config: &Arc<Config>, options: &Arc<RunOptions>, cli: &Cli) {
    info!("Starting booking run for {} users", config.users.len());

    let mut outcomes = if cli.parallel {
        run_parallel(config, options).await
    } else {
        let mut outcomes = Vec::with_capacity(config.users.len());
        for user in &config.users {
            info!("Processing booking for {}", user.prefix);
            outcomes.push(book_user(user, config, options).await);
        }
        outcomes
    };

    // Users whose tables failed to load still show up as failures
    outcomes.extend(config.rejected.iter().map(RejectedUser::outcome));
    outcomes.sort_by(|a, b| a.user.cmp(&b.user));

    println!("\nBooking Results:\n{}", report::summary(&outcomes));

    if let Some(path) = &cli.status_file
        && let Err(e) = report::write_status(path, &outcomes)
    {
        error!("Failed to write status report: {:#}", e);
    }
}

async fn run_parallel(config: &Arc<Config>, options: &Arc<RunOptions>) -> Vec<BookingOutcome> {
    let mut tasks = JoinSet::new();

    for (index, user) in config.users.iter().enumerate() {
        info!("Processing booking for {}", user.prefix);
        let config = Arc::clone(config);
        let options = Arc::clone(options);
        tasks.spawn(async move {
            let user = &config.users[index];
            (index, book_user(user, &config, &options).await)
        });
    }

    let mut outcomes = Vec::with_capacity(config.users.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => outcomes.push(entry),
            Err(e) => error!("Booking task panicked: {}", e),
        }
    }

    // Keep the report in config order
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}
