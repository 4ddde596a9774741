mod config;
mod db;
mod error;
mod marine;
mod models;
mod monitor;
mod notify;

use anyhow::bail;
use clap::{crate_name, crate_version, Parser, Subcommand};
use config::AppConfig;
use db::postgres::PgSubscriberStore;
use db::{SubscriberStore, UnwatchOutcome, WatchOutcome};
use marine::OpenMeteoFetcher;
use models::{Coordinate, WatchedLocation};
use monitor::{RiskMonitorJob, RunOutcome};
use notify::SmtpNotifier;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = crate_name!(), version = crate_version!(), about = "Coastal risk email alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the periodic risk check until interrupted (default).
    Serve,
    /// Run a single risk check now.
    RunOnce,
    /// Watch a location for an email address.
    Subscribe {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        place: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Stop watching a location; the last one removes the subscriber.
    Unsubscribe {
        #[arg(long)]
        email: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Show the locations watched by an email address.
    List {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Coastal Alerts Service...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    db::ensure_schema(&pool).await?;
    info!("Connected to database");

    let store: Arc<dyn SubscriberStore> = Arc::new(PgSubscriberStore::new(pool));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let job = Arc::new(build_job(&config, store)?);
            monitor::scheduler::run(job, config.check_interval(), async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
        }
        Command::RunOnce => {
            let job = build_job(&config, store)?;
            match job.run().await? {
                RunOutcome::Completed(report) => println!("{:#?}", report),
                RunOutcome::Idle => println!("Nothing to check"),
                RunOutcome::Skipped => println!("A run is already in progress"),
            }
        }
        Command::Subscribe {
            name,
            email,
            place,
            lat,
            lon,
        } => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                bail!("coordinates out of range: {},{}", lat, lon);
            }
            let location = WatchedLocation::new(place, lat, lon);
            match store.watch(&name, &email, &location).await? {
                WatchOutcome::Created => println!("Subscribed {} to {}", email, location.display_name),
                WatchOutcome::Added => println!("Added {} for {}", location.display_name, email),
                WatchOutcome::AlreadyWatched => {
                    println!("{} already watches {}", email, location.coordinate);
                    return Ok(());
                }
            }

            // The subscription stands even if the welcome email does not go out.
            let notifier = SmtpNotifier::from_config(&config)?;
            if let Err(e) = notifier
                .send_welcome(&name, &email, &location.display_name)
                .await
            {
                warn!("Failed to send welcome email to {}: {}", email, e);
            }
        }
        Command::Unsubscribe { email, lat, lon } => {
            let coordinate = Coordinate::new(lat, lon);
            match store.unwatch(&email, &coordinate).await? {
                UnwatchOutcome::Removed => println!("Removed {} for {}", coordinate, email),
                UnwatchOutcome::SubscriberDeleted => {
                    println!("Removed last location, {} unsubscribed", email)
                }
                UnwatchOutcome::NotWatched => println!("{} does not watch {}", email, coordinate),
            }
        }
        Command::List { email } => match store.find_by_email(&email).await? {
            Some(subscriber) => {
                for location in &subscriber.locations {
                    println!(
                        "{:<24} {:>10} {:>10}  last notified: {}",
                        location.display_name,
                        location.coordinate.latitude,
                        location.coordinate.longitude,
                        subscriber.last_notified_level(&location.coordinate)
                    );
                }
            }
            None => println!("No subscriptions for {}", email),
        },
    }

    Ok(())
}

fn build_job(config: &AppConfig, store: Arc<dyn SubscriberStore>) -> anyhow::Result<RiskMonitorJob> {
    let fetcher = OpenMeteoFetcher::new(&config.marine_api_url, config.marine_api_timeout())?;
    let notifier = SmtpNotifier::from_config(config)?;
    Ok(RiskMonitorJob::new(
        store,
        Arc::new(fetcher),
        Arc::new(notifier),
        config.fetch_concurrency,
    ))
}
