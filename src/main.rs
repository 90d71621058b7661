use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sd_xmltv::{
    config::Config,
    services::GuideService,
    sources::{ListingsProvider, SchedulesDirectClient, ServiceInfo},
};

#[derive(Parser)]
#[command(name = "sd-xmltv")]
#[command(version)]
#[command(about = "Schedules Direct listings to XMLTV guide generator")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "sd-xmltv.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Schedules Direct API root (no trailing '/')
    #[arg(short = 'U', long, value_name = "URL")]
    base_url: Option<String>,

    /// Schedules Direct username
    #[arg(short, long)]
    username: Option<String>,

    /// Password, preferably as a SHA1 hex digest
    #[arg(short, long)]
    password: Option<String>,

    /// 3-character country code
    #[arg(short = 'C', long)]
    country: Option<String>,

    /// Postal code for headend lookups
    #[arg(short = 'z', long)]
    postal_code: Option<String>,

    /// Lineup code
    #[arg(short, long)]
    lineup: Option<String>,

    /// Request the plain (non verbose) channel map
    #[arg(short = 'M', long)]
    no_verbose_map: bool,

    /// Number of schedule days retrieved
    #[arg(short = 'T', long, value_name = "DAYS")]
    days: Option<u32>,

    /// Guide document path
    #[arg(short = 'X', long, value_name = "FILE")]
    xmltv_file: Option<PathBuf>,

    /// IANA timezone for programme times (host zone by default)
    #[arg(long, value_name = "ZONE")]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch listings and write the XMLTV guide (default)
    Xmltv,
    /// Account and server status
    Status,
    /// Lineups on the account
    Lineups,
    /// Headends for the configured country and postal code
    Headends,
    /// Available services, or the details of one service
    Available { service: Option<String> },
    /// Channel map of the configured lineup
    ChannelMap,
    /// Print the effective configuration
    Config,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        let service = &mut config.service;
        if let Some(base_url) = &self.base_url {
            service.base_url = base_url.clone();
        }
        if let Some(username) = &self.username {
            service.username = username.clone();
        }
        if let Some(password) = &self.password {
            service.password = password.clone();
        }
        if let Some(country) = &self.country {
            service.country = country.clone();
        }
        if let Some(postal_code) = &self.postal_code {
            service.postal_code = postal_code.clone();
        }
        if let Some(lineup) = &self.lineup {
            service.lineup = lineup.clone();
        }
        if self.no_verbose_map {
            service.verbose_map = false;
        }
        if let Some(days) = self.days {
            config.fetch.days = days;
        }
        if let Some(xmltv_file) = &self.xmltv_file {
            config.output.xmltv_file = xmltv_file.clone();
        }
        if let Some(timezone) = &self.timezone {
            config.output.timezone = Some(timezone.clone());
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("sd_xmltv={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(Some(&cli.config))?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let command = cli.command.unwrap_or(Command::Xmltv);
    if let Command::Config = command {
        print!("{}", config.to_redacted_toml()?);
        return Ok(());
    }

    let client = SchedulesDirectClient::new(&config.service, &config.fetch)?;
    match command {
        Command::Xmltv => {
            info!("Starting sd-xmltv v{}", env!("CARGO_PKG_VERSION"));
            let service = GuideService::new(client, config);
            service.generate().await?;
        }
        Command::Status => print_json(&client.status().await?)?,
        Command::Lineups => print_json(&client.lineups().await?)?,
        Command::Headends => {
            print_json(&client.headends(&config.service.country, &config.service.postal_code).await?)?
        }
        Command::Available { service } => print_json(&client.available(service.as_deref()).await?)?,
        Command::ChannelMap => print_json(&client.channel_mapping(&config.service.lineup).await?)?,
        Command::Config => {}
    }

    Ok(())
}
