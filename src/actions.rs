// ABOUTME: Pure action functions, one per transition: compute state patches and output commands.
// ABOUTME: Render commands always precede the search or timer command they accompany.

use crate::catalog::{CastMember, MovieDetails, MovieSummary};
use crate::commands::{Command, RenderParams, Screen};
use crate::dispatch::TimerId;
use crate::machine::Settings;
use crate::store::{ExtendedState, Patch};

/// What a transition's action produced: ordered patches for the extended
/// state and commands for the dispatcher.
#[derive(Debug, Default, PartialEq)]
pub struct ActionOutcome {
    pub updates: Vec<Patch>,
    pub commands: Vec<Command>,
}

/// Start → Querying on navigation: blank loading screen plus the discovery
/// search for an empty query.
pub fn display_loading_screen_and_query_db() -> ActionOutcome {
    ActionOutcome {
        updates: vec![],
        commands: vec![
            Command::Render(RenderParams::new(Screen::Loading)),
            Command::MovieSearch { query: String::new() },
        ],
    }
}

/// TimerRunning → Querying on expiry: fire the debounced search for the
/// query captured in the extended state, and retire the timer handle.
pub fn display_loading_screen_and_query_db_and_cancel_timer(state: &ExtendedState) -> ActionOutcome {
    ActionOutcome {
        updates: vec![],
        commands: vec![
            Command::Render(RenderParams {
                results: state.results.clone(),
                query: Some(state.movie_query.clone()),
                ..RenderParams::new(Screen::SearchResultsAndLoading)
            }),
            Command::MovieSearch { query: state.movie_query.clone() },
            Command::CancelTimer { timer_id: state.timer_id },
        ],
    }
}

/// Querying → TimerRunning on the first edit: show stale results with a
/// loading hint and start the debounce timer.
pub fn display_loading_screen_and_start_timer(
    state: &ExtendedState,
    query: &str,
    settings: &Settings,
) -> ActionOutcome {
    ActionOutcome {
        updates: query_edit_updates(query),
        commands: vec![
            Command::Render(RenderParams {
                results: state.results.clone(),
                query: Some(query.to_string()),
                ..RenderParams::new(Screen::SearchResultsAndLoading)
            }),
            Command::StartTimer { duration: settings.debounce },
        ],
    }
}

/// TimerRunning → TimerRunning on a further edit: push the debounce window
/// out by swapping the running timer for a fresh one.
pub fn display_loading_screen_and_restart_timer(
    state: &ExtendedState,
    query: &str,
    settings: &Settings,
) -> ActionOutcome {
    ActionOutcome {
        updates: query_edit_updates(query),
        commands: vec![
            Command::Render(RenderParams {
                results: state.results.clone(),
                query: Some(query.to_string()),
                ..RenderParams::new(Screen::SearchResultsAndLoading)
            }),
            Command::RestartTimer {
                duration: settings.debounce,
                timer_id: state.timer_id,
            },
        ],
    }
}

/// Selection → Querying on an edit: no debounce here, the search fires
/// immediately.
pub fn display_loading_screen_and_query_non_empty(
    state: &ExtendedState,
    query: &str,
) -> ActionOutcome {
    ActionOutcome {
        updates: query_edit_updates(query),
        commands: vec![
            Command::Render(RenderParams {
                results: state.results.clone(),
                query: Some(query.to_string()),
                ..RenderParams::new(Screen::SearchResultsAndLoading)
            }),
            Command::MovieSearch { query: query.to_string() },
        ],
    }
}

/// Querying → Selection on results: store and show them.
pub fn display_movie_search_results_screen(results: &[MovieSummary], query: &str) -> ActionOutcome {
    ActionOutcome {
        updates: vec![Patch::Results(results.to_vec())],
        commands: vec![Command::Render(RenderParams {
            results: Some(results.to_vec()),
            query: Some(query.to_string()),
            ..RenderParams::new(Screen::SearchResults)
        })],
    }
}

/// DetailSelection → Selection on deselect: back to the stored result list.
pub fn display_current_movie_search_results_screen(state: &ExtendedState) -> ActionOutcome {
    ActionOutcome {
        updates: vec![],
        commands: vec![Command::Render(RenderParams {
            results: state.results.clone(),
            query: Some(state.movie_query.clone()),
            ..RenderParams::new(Screen::SearchResults)
        })],
    }
}

/// Querying → SelectionError: the error screen echoes the query only once
/// the user has actually edited it.
pub fn display_movie_search_error_screen(state: &ExtendedState) -> ActionOutcome {
    let query = if state.query_field_has_changed {
        state.movie_query.clone()
    } else {
        String::new()
    };
    ActionOutcome {
        updates: vec![],
        commands: vec![Command::Render(RenderParams {
            query: Some(query),
            ..RenderParams::new(Screen::SearchError)
        })],
    }
}

/// Selection → DetailQuerying: remember the title, show the loading detail
/// pane, and fetch details plus credits.
pub fn display_details_loading_screen_and_query_details_db(
    state: &ExtendedState,
    movie: &MovieSummary,
) -> ActionOutcome {
    ActionOutcome {
        updates: vec![Patch::MovieTitle(movie.title.clone())],
        commands: vec![
            Command::Render(RenderParams {
                results: state.results.clone(),
                query: Some(state.movie_query.clone()),
                title: Some(movie.title.clone()),
                ..RenderParams::new(Screen::SearchResultsWithDetailsAndLoading)
            }),
            Command::MovieDetailsSearch { movie_id: movie.id },
        ],
    }
}

/// DetailQuerying → DetailSelection: store and show details and cast.
pub fn display_movie_details_search_results_screen(
    state: &ExtendedState,
    details: &MovieDetails,
    cast: &[CastMember],
) -> ActionOutcome {
    ActionOutcome {
        updates: vec![
            Patch::MovieDetails(details.clone()),
            Patch::Cast(cast.to_vec()),
        ],
        commands: vec![Command::Render(RenderParams {
            results: state.results.clone(),
            query: Some(state.movie_query.clone()),
            title: state.movie_title.clone(),
            details: Some(details.clone()),
            cast: Some(cast.to_vec()),
            screen: Screen::SearchResultsWithDetails,
        })],
    }
}

/// DetailQuerying → DetailSelectionError: results and title survive, the
/// detail pane shows the failure.
pub fn display_movie_details_search_error_screen(state: &ExtendedState) -> ActionOutcome {
    ActionOutcome {
        updates: vec![],
        commands: vec![Command::Render(RenderParams {
            results: state.results.clone(),
            query: Some(state.movie_query.clone()),
            title: state.movie_title.clone(),
            ..RenderParams::new(Screen::SearchResultsWithDetailsError)
        })],
    }
}

/// TimerRunning → TimerRegistering: record the freshly issued timer handle.
/// No render; the screen does not change while registering.
pub fn register_timer_id(timer_id: TimerId) -> ActionOutcome {
    ActionOutcome {
        updates: vec![Patch::TimerId(timer_id)],
        commands: vec![],
    }
}

fn query_edit_updates(query: &str) -> Vec<Patch> {
    vec![
        Patch::QueryFieldHasChanged(true),
        Patch::MovieQuery(query.to_string()),
    ]
}
