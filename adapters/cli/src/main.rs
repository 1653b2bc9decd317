#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates music bingo games and checks tickets.

mod game_record;
mod listing;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use music_bingo_core::{BingoTicket, CancellationToken, Outcome, TicketNumber, TicketSize};
use music_bingo_game::{self as game, check::check_ticket, query, Game, GameConfig};
use music_bingo_system_track_order::OrderMode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{game_record::GameRecord, listing::Listing};

/// Music bingo ticket generator.
#[derive(Debug, Parser)]
#[command(name = "music-bingo", version)]
#[command(about = "Generate music bingo tickets and check winning claims")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the playback order and tickets for a track listing.
    Generate(GenerateArgs),
    /// Report when a ticket from a saved game record wins.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// TOML track listing.
    listing: PathBuf,
    /// Number of tickets to generate.
    #[arg(short, long)]
    tickets: Option<u32>,
    /// Rows on each ticket.
    #[arg(long)]
    rows: Option<u32>,
    /// Columns on each ticket.
    #[arg(long)]
    columns: Option<u32>,
    /// Smallest track pool accepted.
    #[arg(long)]
    minimum_pool: Option<usize>,
    /// Play the tracks in listing order.
    #[arg(long)]
    no_shuffle: bool,
    /// Seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,
    /// Write the game record to this file instead of stdout.
    #[arg(long)]
    record_out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// File holding a game record written by `generate`.
    record: PathBuf,
    /// Number printed on the ticket.
    #[arg(short, long)]
    ticket: u32,
    /// Tracks played so far.
    #[arg(short, long)]
    played: Option<usize>,
}

/// Entry point for the music bingo command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "music_bingo=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let text = fs::read_to_string(&args.listing)
        .with_context(|| format!("reading track listing {}", args.listing.display()))?;
    let listing = Listing::parse(&text)
        .with_context(|| format!("parsing track listing {}", args.listing.display()))?;
    let config = game_config(&args, &listing)?;

    let mut rng = config.rng();
    let outcome = game::generate(
        &config,
        listing.sources(),
        &mut rng,
        &CancellationToken::new(),
    )?;
    let Outcome::Completed(game) = outcome else {
        bail!("game generation was aborted");
    };

    print_order(&game);
    print_tickets(&game);

    let encoded = GameRecord::of(&game).encode()?;
    match &args.record_out {
        Some(path) => {
            fs::write(path, format!("{encoded}\n"))
                .with_context(|| format!("writing game record {}", path.display()))?;
            info!(path = %path.display(), "saved game record");
        }
        None => println!("\n{encoded}"),
    }
    Ok(())
}

fn game_config(args: &GenerateArgs, listing: &Listing) -> Result<GameConfig> {
    let section = &listing.game;
    let mut config = GameConfig::default();
    if let Some(tickets) = args.tickets.or(section.tickets) {
        config = GameConfig::new(tickets);
    }

    let default_size = TicketSize::default();
    let rows = args.rows.or(section.rows).unwrap_or(default_size.rows());
    let columns = args
        .columns
        .or(section.columns)
        .unwrap_or(default_size.columns());
    config = config.with_ticket_size(TicketSize::new(rows, columns)?);

    if args.no_shuffle || section.shuffle == Some(false) {
        config = config.with_order_mode(OrderMode::Sequential);
    }
    if let Some(minimum) = args.minimum_pool.or(section.minimum_pool) {
        config = config.with_minimum_pool(minimum);
    }
    if let Some(seed) = args.seed.or(section.seed) {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn print_order(game: &Game) {
    println!("Playback order");
    for (position, track) in query::track_order(game).tracks().iter().enumerate() {
        println!("{:>4}. {} - {}", position + 1, track.title(), track.artist());
    }
}

fn print_tickets(game: &Game) {
    let columns = query::ticket_size(game).columns() as usize;
    for ticket in query::tickets_in_print_order(game) {
        println!();
        print_ticket(ticket, columns);
    }
}

fn print_ticket(ticket: &BingoTicket, columns: usize) {
    println!(
        "Ticket {} (wins at track {})",
        ticket.number(),
        ticket.win_point()
    );
    for row in ticket.tracks().chunks(columns.max(1)) {
        let titles: Vec<&str> = row.iter().map(|track| track.title()).collect();
        println!("  {}", titles.join(" | "));
    }
}

fn run_check(args: CheckArgs) -> Result<()> {
    let text = fs::read_to_string(&args.record)
        .with_context(|| format!("reading game record {}", args.record.display()))?;
    let record = GameRecord::decode(&text)
        .with_context(|| format!("decoding game record {}", args.record.display()))?;

    let number = TicketNumber::new(args.ticket);
    let Some(ticket) = record.ticket(number) else {
        bail!("game record has no ticket {number}");
    };
    let check = check_ticket(&record.order, ticket)?;

    println!(
        "Ticket {} wins at track {} of {}",
        check.number(),
        check.win_point(),
        record.order.len()
    );
    if let Some(played) = args.played {
        let verdict = if check.has_won_after(played) {
            "has won"
        } else {
            "has not won yet"
        };
        println!("After {played} tracks the ticket {verdict}");
    }
    Ok(())
}
