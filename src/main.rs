// ABOUTME: Entry point for the marquee movie-search terminal front end.
// ABOUTME: Wires the state machine, catalog client, debounce timers, and stdin events into an event loop.

mod actions;
mod catalog;
mod commands;
mod config;
mod dispatch;
mod machine;
mod render;
mod runtime;
mod state;
mod store;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use catalog::{MovieSummary, TmdbCatalog};
use config::Config;
use dispatch::{Effects, Timers};
use machine::{Machine, Settings};
use render::ConsoleRenderer;
use runtime::{EventSender, Runtime};
use state::Event;

type DynError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("Failed to register SIGTERM handler");

    tokio::select! {
        result = run() => {
            if let Err(e) = result {
                tracing::error!("Fatal: {e}");
                std::process::exit(1);
            }
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
        }
    }
}

async fn run() -> Result<(), DynError> {
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    let (tx, rx) = mpsc::unbounded_channel();

    let renderer = ConsoleRenderer::new();
    let displayed = renderer.displayed();
    let effects = Effects {
        catalog: Arc::new(TmdbCatalog::from_config(&config.catalog)),
        timers: Timers::new(tx.clone()),
        renderer: Box::new(renderer),
    };
    let machine = Machine::new(Settings {
        debounce: Duration::from_millis(config.ui.debounce_ms),
    });
    let runtime = Runtime::new(machine, effects, tx.clone(), rx);

    // The session opens the way a page load does.
    tx.send(Event::UserNavigatedToApp)?;

    let input = read_input(tx, displayed);
    tokio::select! {
        _ = runtime.run() => {}
        _ = input => {
            tracing::info!("Input closed, shutting down");
        }
    }
    Ok(())
}

/// Translate stdin lines into machine events. Plain text edits the query;
/// `/open N` selects the Nth displayed result; `/back` leaves the detail
/// view; `/quit` (or EOF) ends the session.
async fn read_input(tx: EventSender, displayed: Arc<Mutex<Vec<MovieSummary>>>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line == "/back" {
            let _ = tx.send(Event::MovieDetailsDeselected);
            continue;
        }
        if let Some(number) = line.strip_prefix("/open") {
            match number.trim().parse::<usize>() {
                Ok(n) if n >= 1 => {
                    let movie = displayed.lock().unwrap().get(n - 1).cloned();
                    match movie {
                        Some(movie) => {
                            let _ = tx.send(Event::MovieSelected { movie });
                        }
                        None => println!("No result #{n} on screen"),
                    }
                }
                _ => println!("Usage: /open <number>"),
            }
            continue;
        }
        let _ = tx.send(Event::QueryChanged { query: line.to_string() });
    }
}
