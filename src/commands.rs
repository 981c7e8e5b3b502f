// ABOUTME: Declarative commands emitted by actions, and the screen vocabulary for render commands.
// ABOUTME: Commands only describe intent; the dispatcher performs the side effects.

use std::fmt;
use std::time::Duration;

use crate::catalog::{CastMember, MovieDetails, MovieSummary};
use crate::dispatch::TimerId;

/// Screens the render collaborator knows how to draw. The screen choice is a
/// direct function of the transition taken, never re-derived from state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    SearchError,
    SearchResultsAndLoading,
    SearchResults,
    SearchResultsWithDetails,
    SearchResultsWithDetailsAndLoading,
    SearchResultsWithDetailsError,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Loading => write!(f, "Loading"),
            Screen::SearchError => write!(f, "SearchError"),
            Screen::SearchResultsAndLoading => write!(f, "SearchResultsAndLoading"),
            Screen::SearchResults => write!(f, "SearchResults"),
            Screen::SearchResultsWithDetails => write!(f, "SearchResultsWithDetails"),
            Screen::SearchResultsWithDetailsAndLoading => {
                write!(f, "SearchResultsWithDetailsAndLoading")
            }
            Screen::SearchResultsWithDetailsError => write!(f, "SearchResultsWithDetailsError"),
        }
    }
}

/// Data handed to the render collaborator. Fields a screen does not use stay
/// `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub screen: Screen,
    pub results: Option<Vec<MovieSummary>>,
    pub query: Option<String>,
    pub title: Option<String>,
    pub details: Option<MovieDetails>,
    pub cast: Option<Vec<CastMember>>,
}

impl RenderParams {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            results: None,
            query: None,
            title: None,
            details: None,
            cast: None,
        }
    }
}

/// Side effects requested by a transition, dispatched in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render(RenderParams),
    MovieSearch { query: String },
    MovieDetailsSearch { movie_id: u64 },
    StartTimer { duration: Duration },
    RestartTimer { duration: Duration, timer_id: Option<TimerId> },
    CancelTimer { timer_id: Option<TimerId> },
}
