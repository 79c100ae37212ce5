//! Tournament sync bot.
//!
//! Pulls start.gg tournaments for a configured state or owner list, filters
//! them by game, and mirrors the result into a Discord guild's scheduled
//! events. Cycles run strictly one at a time so two synchronizer passes can
//! never interleave against the same feed.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::{error, info};
use pico_args::Arguments;
use tournament_sync::{
    DiscordClient, EventSynchronizer, FileLedger, MatchPolicy, StartggClient, TimeWindow,
    TournamentPuller,
};

use config::{BotConfig, DedupMode};

const HELP: &str = "\
Pull start.gg tournaments and sync them into Discord scheduled events

USAGE:
  ts_bot [OPTIONS]

OPTIONS:
  --once                   Run a single pull/filter/sync cycle and exit
  --interval-mins N        Minutes between cycles  [default: env SYNC_INTERVAL_MINS or 60]
  --export PATH            Write the filtered collection to PATH each cycle

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  STARTGG_API_KEY          start.gg API credential (required)
  BOT_TOKEN                Discord bot token (required)
  GUILD_ID                 Discord guild id (required)
  STATE                    Two-letter US state selector, e.g. NC
  OWNER_IDS                Comma-separated start.gg owner ids
  GAME_SLUGS               Comma-separated game slugs, e.g. game/street-fighter-6
  WINDOW_DAYS              Days ahead to search  [default: 30]
  DEDUP_POLICY             name | ledger  [default: name]
  LEDGER_PATH              Dedup ledger file for the ledger policy
  EXPORT_PATH              Optional JSON export destination
  SYNC_INTERVAL_MINS       Minutes between cycles  [default: 60]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let once = pargs.contains("--once");
    let interval_override: Option<u64> = pargs.opt_value_from_str("--interval-mins")?;
    let export_override: Option<PathBuf> = pargs.opt_value_from_str("--export")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let mut config = BotConfig::from_env().map_err(Error::from)?;
    if let Some(mins) = interval_override {
        config.interval_mins = mins;
    }
    if let Some(path) = export_override {
        config.export_path = Some(path);
    }
    config.validate()?;

    info!("starting tournament sync bot for guild {}", config.guild_id);

    // One cycle runs to completion before the next is triggered, so no two
    // synchronizer passes ever overlap on the same feed.
    loop {
        let result = run_cycle(&config).await;
        match &result {
            Ok(summary) => info!("cycle complete: {summary}"),
            Err(e) => error!("run aborted: {e:#}"),
        }

        if once {
            // Single-shot mode reports the cycle outcome through the exit
            // status instead of swallowing it.
            return result.map(|_| ());
        }
        tokio::time::sleep(std::time::Duration::from_secs(config.interval_mins * 60)).await;
    }
}

/// One pull -> filter -> export -> sync cycle.
async fn run_cycle(config: &BotConfig) -> anyhow::Result<String> {
    let source = StartggClient::new(config.startgg_api_key.clone());
    let window = TimeWindow::next_days(config.window_days)?;

    let mut puller = TournamentPuller::new(source, window);
    if let Some(state) = &config.state {
        puller = puller.with_state(state.clone());
    }
    if !config.owner_ids.is_empty() {
        puller = puller.with_owners(config.owner_ids.clone());
    }
    if !config.game_slugs.is_empty() {
        puller = puller.with_games(config.game_slugs.clone());
    }

    if config.state.is_some() {
        puller
            .initiate_by_state(None)
            .await
            .context("tournament fetch by state failed")?;
        // With both selectors configured the state query leads and the
        // owner list narrows it.
        if !config.owner_ids.is_empty() {
            puller.filter_by_owner(None)?;
        }
    } else {
        puller
            .initiate_by_owners(None)
            .await
            .context("tournament fetch by owners failed")?;
    }

    if !config.game_slugs.is_empty() {
        puller.filter_by_game(None)?;
    }

    info!("{} tournaments after filtering", puller.collection().len());

    if let Some(path) = &config.export_path {
        // Export is a side channel; a failed export never aborts the sync.
        match puller.export(path) {
            Ok(()) => info!("exported collection to {}", path.display()),
            Err(e) => error!("export to {} failed: {e}", path.display()),
        }
    }

    let feed = DiscordClient::new(config.discord_token.clone(), config.guild_id);
    let policy = match config.dedup {
        DedupMode::EventName => MatchPolicy::EventName,
        DedupMode::Ledger => MatchPolicy::Ledger(Box::new(
            FileLedger::open(&config.ledger_path).context("failed to open dedup ledger")?,
        )),
    };

    let synchronizer = EventSynchronizer::new(feed, policy);
    let report = synchronizer
        .sync(puller.collection())
        .await
        .context("event sync failed")?;
    Ok(report.summary())
}
