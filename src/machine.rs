// ABOUTME: The state machine engine: transition table lookup, patch application, eventless resolution.
// ABOUTME: Processes one event fully and returns the commands the transition produced, in dispatch order.

use std::time::Duration;

use crate::actions::{self, ActionOutcome};
use crate::commands::Command;
use crate::state::{Event, State};
use crate::store::ExtendedState;

/// Machine tunables. The debounce duration is the only one.
#[derive(Debug, Clone)]
pub struct Settings {
    pub debounce: Duration,
}

/// Owns the control state and the extended state for one UI session.
pub struct Machine {
    control: State,
    extended: ExtendedState,
    settings: Settings,
}

impl Machine {
    pub fn new(settings: Settings) -> Self {
        Self {
            control: State::Start,
            extended: ExtendedState::default(),
            settings,
        }
    }

    pub fn control(&self) -> State {
        self.control
    }

    pub fn extended(&self) -> &ExtendedState {
        &self.extended
    }

    /// Process one event: look up the transition for the current control
    /// state, run its action, apply the patches, advance, then resolve any
    /// eventless transitions out of the new state. Events with no transition
    /// in the current state are ignored.
    pub fn process_event(&mut self, event: &Event) -> Vec<Command> {
        let Some((to, outcome)) = step(self.control, &self.extended, event, &self.settings) else {
            tracing::debug!("Ignoring {} in state {}", event.kind(), self.control);
            return Vec::new();
        };
        tracing::debug!("{} + {} -> {}", self.control, event.kind(), to);

        self.extended.apply_updates(outcome.updates);
        self.control = to;
        let mut commands = outcome.commands;

        // The automatic chain is finite by construction: the only eventless
        // transition leads to TimerRunning, which has none of its own.
        while let Some((to, outcome)) = automatic(self.control) {
            tracing::debug!("{} -> {} (automatic)", self.control, to);
            self.extended.apply_updates(outcome.updates);
            self.control = to;
            commands.extend(outcome.commands);
        }

        commands
    }
}

/// The transition table: `(control state, event kind)` to `(target state,
/// action result)`. Rows absent from the match mean the event is not valid
/// in that state.
fn step(
    control: State,
    state: &ExtendedState,
    event: &Event,
    settings: &Settings,
) -> Option<(State, ActionOutcome)> {
    match (control, event) {
        (State::Start, Event::UserNavigatedToApp) => Some((
            State::Querying,
            actions::display_loading_screen_and_query_db(),
        )),
        (State::Querying, Event::SearchResultsReceived { results, query }) => Some((
            State::Selection,
            actions::display_movie_search_results_screen(results, query),
        )),
        (State::Querying, Event::SearchErrorReceived { .. }) => Some((
            State::SelectionError,
            actions::display_movie_search_error_screen(state),
        )),
        (State::Querying, Event::QueryChanged { query }) => Some((
            State::TimerRunning,
            actions::display_loading_screen_and_start_timer(state, query, settings),
        )),
        (State::TimerRunning, Event::QueryChanged { query }) => Some((
            State::TimerRunning,
            actions::display_loading_screen_and_restart_timer(state, query, settings),
        )),
        (State::TimerRunning, Event::TimerExpired) => Some((
            State::Querying,
            actions::display_loading_screen_and_query_db_and_cancel_timer(state),
        )),
        (State::TimerRunning, Event::TimerIdReceived { timer_id }) => Some((
            State::TimerRegistering,
            actions::register_timer_id(*timer_id),
        )),
        (State::Selection, Event::QueryChanged { query }) => Some((
            State::Querying,
            actions::display_loading_screen_and_query_non_empty(state, query),
        )),
        (State::Selection, Event::MovieSelected { movie }) => Some((
            State::DetailQuerying,
            actions::display_details_loading_screen_and_query_details_db(state, movie),
        )),
        (State::DetailQuerying, Event::MovieDetailsReceived { details, cast }) => Some((
            State::DetailSelection,
            actions::display_movie_details_search_results_screen(state, details, cast),
        )),
        (State::DetailQuerying, Event::MovieDetailsErrorReceived) => Some((
            State::DetailSelectionError,
            actions::display_movie_details_search_error_screen(state),
        )),
        (State::DetailSelection, Event::MovieDetailsDeselected) => Some((
            State::Selection,
            actions::display_current_movie_search_results_screen(state),
        )),
        _ => None,
    }
}

/// Eventless transitions, taken unconditionally upon entering a state.
fn automatic(control: State) -> Option<(State, ActionOutcome)> {
    match control {
        State::TimerRegistering => Some((State::TimerRunning, ActionOutcome::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CastMember, MovieDetails, MovieSummary};
    use crate::commands::Screen;
    use crate::dispatch::TimerId;

    fn machine_at(control: State, extended: ExtendedState) -> Machine {
        Machine {
            control,
            extended,
            settings: Settings {
                debounce: Duration::from_millis(200),
            },
        }
    }

    fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            release_date: None,
            overview: None,
            vote_average: None,
        }
    }

    fn details(id: u64, title: &str) -> MovieDetails {
        MovieDetails {
            id,
            title: title.to_string(),
            overview: None,
            release_date: None,
            runtime: Some(148),
            vote_average: None,
        }
    }

    fn render_screen(command: &Command) -> Screen {
        match command {
            Command::Render(params) => params.screen,
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn unhandled_events_change_nothing_and_emit_no_commands() {
        let cases = [
            (State::Start, Event::TimerExpired),
            (State::Start, Event::QueryChanged { query: "x".into() }),
            (State::Selection, Event::TimerExpired),
            (
                State::Selection,
                Event::SearchResultsReceived { results: vec![], query: "x".into() },
            ),
            (State::SelectionError, Event::MovieDetailsDeselected),
            (State::DetailQuerying, Event::QueryChanged { query: "x".into() }),
            (State::DetailSelection, Event::TimerExpired),
            (State::Querying, Event::MovieSelected { movie: movie(1, "m") }),
            (State::TimerRunning, Event::MovieDetailsErrorReceived),
        ];
        for (control, event) in cases {
            let extended = ExtendedState {
                movie_query: "prior".to_string(),
                ..ExtendedState::default()
            };
            let mut machine = machine_at(control, extended.clone());
            let commands = machine.process_event(&event);
            assert!(commands.is_empty(), "{control} + {} emitted commands", event.kind());
            assert_eq!(machine.control(), control);
            assert_eq!(machine.extended(), &extended);
        }
    }

    #[test]
    fn navigation_renders_loading_and_queries_with_empty_query() {
        let mut machine = Machine::new(Settings {
            debounce: Duration::from_millis(200),
        });
        let commands = machine.process_event(&Event::UserNavigatedToApp);

        assert_eq!(machine.control(), State::Querying);
        assert_eq!(render_screen(&commands[0]), Screen::Loading);
        assert_eq!(commands[1], Command::MovieSearch { query: String::new() });
    }

    #[test]
    fn edit_in_selection_searches_immediately_with_prior_results_on_screen() {
        let prior = vec![movie(1, "Batman Begins"), movie(2, "The Dark Knight")];
        let mut machine = machine_at(
            State::Selection,
            ExtendedState {
                results: Some(prior.clone()),
                ..ExtendedState::default()
            },
        );

        let commands = machine.process_event(&Event::QueryChanged { query: "batman".into() });

        assert_eq!(machine.control(), State::Querying);
        assert_eq!(machine.extended().movie_query, "batman");
        assert!(machine.extended().query_field_has_changed);
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResultsAndLoading);
                assert_eq!(params.results.as_deref(), Some(prior.as_slice()));
                assert_eq!(params.query.as_deref(), Some("batman"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
        assert_eq!(commands[1], Command::MovieSearch { query: "batman".into() });
    }

    #[test]
    fn first_edit_while_querying_starts_the_debounce_timer() {
        let mut machine = machine_at(State::Querying, ExtendedState::default());
        let commands = machine.process_event(&Event::QueryChanged { query: "b".into() });

        assert_eq!(machine.control(), State::TimerRunning);
        assert_eq!(render_screen(&commands[0]), Screen::SearchResultsAndLoading);
        assert_eq!(
            commands[1],
            Command::StartTimer { duration: Duration::from_millis(200) }
        );
    }

    #[test]
    fn timer_registration_passes_through_the_registering_state() {
        let mut machine = machine_at(State::TimerRunning, ExtendedState::default());
        let commands = machine.process_event(&Event::TimerIdReceived { timer_id: TimerId::from_raw(7) });

        // The eventless transition lands back in TimerRunning immediately.
        assert_eq!(machine.control(), State::TimerRunning);
        assert!(commands.is_empty());
        assert_eq!(machine.extended().timer_id, Some(TimerId::from_raw(7)));
    }

    #[test]
    fn restart_carries_the_most_recently_registered_handle() {
        let mut machine = machine_at(State::Querying, ExtendedState::default());

        let first = machine.process_event(&Event::QueryChanged { query: "b".into() });
        assert!(matches!(first[1], Command::StartTimer { .. }));

        machine.process_event(&Event::TimerIdReceived { timer_id: TimerId::from_raw(3) });
        let second = machine.process_event(&Event::QueryChanged { query: "ba".into() });
        assert_eq!(
            second[1],
            Command::RestartTimer {
                duration: Duration::from_millis(200),
                timer_id: Some(TimerId::from_raw(3)),
            }
        );

        // A newer registration replaces the handle used by the next restart.
        machine.process_event(&Event::TimerIdReceived { timer_id: TimerId::from_raw(9) });
        let third = machine.process_event(&Event::QueryChanged { query: "bat".into() });
        assert_eq!(
            third[1],
            Command::RestartTimer {
                duration: Duration::from_millis(200),
                timer_id: Some(TimerId::from_raw(9)),
            }
        );
    }

    #[test]
    fn expiry_fires_the_debounced_search_and_retires_the_timer() {
        let mut machine = machine_at(
            State::TimerRunning,
            ExtendedState {
                movie_query: "alien".to_string(),
                timer_id: Some(TimerId::from_raw(5)),
                ..ExtendedState::default()
            },
        );

        let commands = machine.process_event(&Event::TimerExpired);

        assert_eq!(machine.control(), State::Querying);
        assert_eq!(render_screen(&commands[0]), Screen::SearchResultsAndLoading);
        assert_eq!(commands[1], Command::MovieSearch { query: "alien".into() });
        assert_eq!(commands[2], Command::CancelTimer { timer_id: Some(TimerId::from_raw(5)) });
    }

    #[test]
    fn results_received_stores_results_and_shows_them() {
        let mut machine = machine_at(State::Querying, ExtendedState::default());
        let results = vec![movie(1, "m1"), movie(2, "m2")];

        let commands = machine.process_event(&Event::SearchResultsReceived {
            results: results.clone(),
            query: "x".into(),
        });

        assert_eq!(machine.control(), State::Selection);
        assert_eq!(machine.extended().results, Some(results.clone()));
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResults);
                assert_eq!(params.results.as_deref(), Some(results.as_slice()));
                assert_eq!(params.query.as_deref(), Some("x"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn search_error_echoes_the_query_only_after_an_edit() {
        let mut untouched = machine_at(State::Querying, ExtendedState::default());
        let commands = untouched.process_event(&Event::SearchErrorReceived { query: String::new() });
        assert_eq!(untouched.control(), State::SelectionError);
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchError);
                assert_eq!(params.query.as_deref(), Some(""));
            }
            other => panic!("expected render command, got {other:?}"),
        }

        let mut edited = machine_at(
            State::Querying,
            ExtendedState {
                query_field_has_changed: true,
                movie_query: "batman".to_string(),
                ..ExtendedState::default()
            },
        );
        let commands = edited.process_event(&Event::SearchErrorReceived { query: "batman".into() });
        match &commands[0] {
            Command::Render(params) => assert_eq!(params.query.as_deref(), Some("batman")),
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn selecting_a_movie_stores_the_title_and_queries_details() {
        let mut machine = machine_at(
            State::Selection,
            ExtendedState {
                results: Some(vec![movie(42, "Inception")]),
                movie_query: "incep".to_string(),
                ..ExtendedState::default()
            },
        );
        assert_eq!(machine.extended().movie_title, None);

        let commands = machine.process_event(&Event::MovieSelected { movie: movie(42, "Inception") });

        assert_eq!(machine.control(), State::DetailQuerying);
        assert_eq!(machine.extended().movie_title.as_deref(), Some("Inception"));
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResultsWithDetailsAndLoading);
                assert_eq!(params.title.as_deref(), Some("Inception"));
                assert_eq!(params.query.as_deref(), Some("incep"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
        assert_eq!(commands[1], Command::MovieDetailsSearch { movie_id: 42 });
    }

    #[test]
    fn detail_results_store_details_and_cast() {
        let mut machine = machine_at(
            State::DetailQuerying,
            ExtendedState {
                movie_title: Some("Inception".to_string()),
                ..ExtendedState::default()
            },
        );
        let cast = vec![CastMember {
            name: "Leonardo DiCaprio".to_string(),
            character: Some("Cobb".to_string()),
        }];

        let commands = machine.process_event(&Event::MovieDetailsReceived {
            details: details(42, "Inception"),
            cast: cast.clone(),
        });

        assert_eq!(machine.control(), State::DetailSelection);
        assert_eq!(machine.extended().movie_details, Some(details(42, "Inception")));
        assert_eq!(machine.extended().cast, Some(cast.clone()));
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResultsWithDetails);
                assert_eq!(params.details, Some(details(42, "Inception")));
                assert_eq!(params.cast.as_deref(), Some(cast.as_slice()));
                assert_eq!(params.title.as_deref(), Some("Inception"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn detail_error_preserves_results_and_title() {
        let prior = vec![movie(42, "Inception")];
        let mut machine = machine_at(
            State::DetailQuerying,
            ExtendedState {
                results: Some(prior.clone()),
                movie_title: Some("Inception".to_string()),
                ..ExtendedState::default()
            },
        );

        let commands = machine.process_event(&Event::MovieDetailsErrorReceived);

        assert_eq!(machine.control(), State::DetailSelectionError);
        assert_eq!(machine.extended().results, Some(prior.clone()));
        assert_eq!(machine.extended().movie_title.as_deref(), Some("Inception"));
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResultsWithDetailsError);
                assert_eq!(params.results.as_deref(), Some(prior.as_slice()));
                assert_eq!(params.title.as_deref(), Some("Inception"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn deselecting_returns_to_the_stored_result_list() {
        let prior = vec![movie(1, "m1")];
        let mut machine = machine_at(
            State::DetailSelection,
            ExtendedState {
                results: Some(prior.clone()),
                movie_query: "m".to_string(),
                movie_title: Some("m1".to_string()),
                ..ExtendedState::default()
            },
        );

        let commands = machine.process_event(&Event::MovieDetailsDeselected);

        assert_eq!(machine.control(), State::Selection);
        match &commands[0] {
            Command::Render(params) => {
                assert_eq!(params.screen, Screen::SearchResults);
                assert_eq!(params.results.as_deref(), Some(prior.as_slice()));
                assert_eq!(params.query.as_deref(), Some("m"));
            }
            other => panic!("expected render command, got {other:?}"),
        }
    }
}
