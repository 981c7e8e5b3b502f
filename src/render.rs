// ABOUTME: The render collaborator seam and the console renderer used by the terminal front end.
// ABOUTME: The console renderer remembers the displayed list so selections can be resolved by row number.

use std::sync::{Arc, Mutex};

use crate::catalog::MovieSummary;
use crate::commands::{RenderParams, Screen};

/// Render collaborator: turns a screen descriptor into output. Must not feed
/// events back into the machine.
pub trait Renderer: Send + Sync {
    fn render(&self, params: &RenderParams);
}

/// Plain-text renderer for the interactive terminal session.
pub struct ConsoleRenderer {
    displayed: Arc<Mutex<Vec<MovieSummary>>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            displayed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the result list currently on screen. The stdin reader
    /// uses it to turn "/open N" into a movie selection.
    pub fn displayed(&self) -> Arc<Mutex<Vec<MovieSummary>>> {
        self.displayed.clone()
    }

    fn print_results(&self, params: &RenderParams) {
        let results = params.results.as_deref().unwrap_or_default();
        *self.displayed.lock().unwrap() = results.to_vec();

        if let Some(query) = params.query.as_deref() {
            if query.is_empty() {
                println!("Popular movies:");
            } else {
                println!("Results for \"{query}\":");
            }
        }
        for (index, movie) in results.iter().enumerate() {
            let year = movie
                .release_date
                .as_deref()
                .and_then(|date| date.get(..4))
                .unwrap_or("----");
            println!("  {:>2}. {} ({year})", index + 1, movie.title);
        }
        if results.is_empty() {
            println!("  (no results)");
        }
    }

    fn print_details(&self, params: &RenderParams) {
        if let Some(details) = &params.details {
            println!("--- {} ---", details.title);
            if let Some(date) = &details.release_date {
                println!("Released: {date}");
            }
            if let Some(runtime) = details.runtime {
                println!("Runtime: {runtime} min");
            }
            if let Some(vote) = details.vote_average {
                println!("Rating: {vote:.1}/10");
            }
            if let Some(overview) = &details.overview {
                println!("{overview}");
            }
        }
        if let Some(cast) = &params.cast {
            println!("Cast:");
            for member in cast.iter().take(8) {
                match &member.character {
                    Some(character) => println!("  {} as {character}", member.name),
                    None => println!("  {}", member.name),
                }
            }
        }
        println!("(/back to return to the results)");
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, params: &RenderParams) {
        match params.screen {
            Screen::Loading => println!("Loading..."),
            Screen::SearchError => {
                let query = params.query.as_deref().unwrap_or_default();
                if query.is_empty() {
                    println!("Search failed. Type a query to retry.");
                } else {
                    println!("Search for \"{query}\" failed. Edit the query to retry.");
                }
            }
            Screen::SearchResultsAndLoading => {
                self.print_results(params);
                println!("  searching...");
            }
            Screen::SearchResults => {
                self.print_results(params);
                println!("(/open N for details, /quit to exit)");
            }
            Screen::SearchResultsWithDetailsAndLoading => {
                let title = params.title.as_deref().unwrap_or_default();
                println!("Loading details for {title}...");
            }
            Screen::SearchResultsWithDetails => self.print_details(params),
            Screen::SearchResultsWithDetailsError => {
                let title = params.title.as_deref().unwrap_or_default();
                println!("Could not load details for {title}. (/back to return)");
            }
        }
    }
}
