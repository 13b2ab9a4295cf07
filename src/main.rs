//! Numble - CLI
//!
//! Scores and validates codes, and plays a scripted demo game against the
//! in-memory store.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use numble::{
    Code, Feedback, MemoryStore, NumbleConfig, PlayerSession, RoomEvent, RoomService, RoomStatus,
    score, score_str, validate,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Score { secret, guess } => {
            let feedback = score_str(&secret, &guess)?;
            println!("{}", feedback);
            Ok(())
        }
        Command::Validate { code } => match validate(&code) {
            Ok(code) => {
                println!("{} is valid", code);
                Ok(())
            }
            Err(e) => {
                println!("{} is invalid: {}", code, e);
                std::process::exit(1);
            }
        },
        Command::Demo {
            host,
            guest,
            host_secret,
            guest_secret,
            config,
        } => {
            let config = match config {
                Some(path) => NumbleConfig::from_file(path)?,
                None => NumbleConfig::default(),
            }
            .with_env_overrides()?;
            run_demo(config, &host, &guest, &host_secret, &guest_secret).await
        }
    }
}

/// Every well-formed code, in ascending order.
fn all_codes() -> Vec<Code> {
    (1234..=9876)
        .filter_map(|n: u32| validate(&n.to_string()).ok())
        .collect()
}

/// First code still consistent with everything learned so far.
fn next_guess(candidates: &[Code], history: &[(Code, Feedback)]) -> Option<Code> {
    candidates
        .iter()
        .find(|c| history.iter().all(|(g, fb)| score(c, g) == *fb))
        .copied()
}

/// Plays a full game between two scripted players.
#[instrument(skip(config, host_secret, guest_secret))]
async fn run_demo(
    config: NumbleConfig,
    host: &str,
    guest: &str,
    host_secret: &str,
    guest_secret: &str,
) -> Result<()> {
    info!("Starting demo game");
    let service = RoomService::new(MemoryStore::new(), config);

    let host_session = service.create_room(host).await?;
    let code = host_session.room_code().clone();
    println!("Room {} opened by {}", code, host);

    let mut watch = service.watch_room(&code).await?;
    let watcher = tokio::spawn(async move {
        while let Some(event) = watch.next().await {
            match event {
                RoomEvent::Updated(room) => info!(
                    status = %room.status(),
                    players = room.players().len(),
                    guesses = room.guesses().len(),
                    "Snapshot"
                ),
                RoomEvent::Deleted => {
                    info!("Room deleted");
                    break;
                }
            }
        }
        watch.close();
    });

    let guest_session = service.join_room(&code, guest).await?;
    println!("{} joined", guest);

    service.set_secret(&host_session, host_secret).await?;
    let status = service.set_secret(&guest_session, guest_secret).await?;
    println!("Secrets set, room is {}", status);

    let candidates = all_codes();
    let mut histories: [Vec<(Code, Feedback)>; 2] = [Vec::new(), Vec::new()];
    let players: [(&PlayerSession, &str); 2] = [(&host_session, host), (&guest_session, guest)];

    'game: loop {
        for (turn, (session, name)) in players.iter().enumerate() {
            let Some(guess) = next_guess(&candidates, &histories[turn]) else {
                warn!(player = %name, "No consistent code left");
                break 'game;
            };
            let outcome = service.submit_guess(session, &guess.to_string()).await?;
            println!("{:>8} guesses {} -> {}", name, guess, outcome.feedback());
            histories[turn].push((guess, *outcome.feedback()));
            if *outcome.won() {
                println!("{} wins after {} guesses", name, histories[turn].len());
                break 'game;
            }
        }
    }

    if let Some(room) = service.get_room(&code).await? {
        if *room.status() != RoomStatus::Finished {
            warn!(status = %room.status(), "Demo ended before a winner");
        }
    }

    service.leave_room(&guest_session).await?;
    service.leave_room(&host_session).await?;
    watcher.await?;
    info!("Demo finished");
    Ok(())
}
