// ABOUTME: Extended-state document carried alongside the control state.
// ABOUTME: The document changes only through ordered patch operations returned by actions.

use crate::catalog::{CastMember, MovieDetails, MovieSummary};
use crate::dispatch::TimerId;

/// Auxiliary data for the search session. Created with fixed defaults when
/// the machine is built and mutated exclusively through [`Patch`] batches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendedState {
    pub query_field_has_changed: bool,
    pub movie_query: String,
    pub results: Option<Vec<MovieSummary>>,
    pub movie_title: Option<String>,
    pub movie_details: Option<MovieDetails>,
    pub cast: Option<Vec<CastMember>>,
    pub timer_id: Option<TimerId>,
}

/// One patch operation over the fixed field set. The target field is part of
/// the variant, so a patch can never address an unknown path.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    QueryFieldHasChanged(bool),
    MovieQuery(String),
    Results(Vec<MovieSummary>),
    MovieTitle(String),
    MovieDetails(MovieDetails),
    Cast(Vec<CastMember>),
    TimerId(TimerId),
}

impl ExtendedState {
    /// Apply a patch batch in order. Later operations on the same field
    /// overwrite earlier ones within the batch.
    pub fn apply_updates(&mut self, updates: Vec<Patch>) {
        for patch in updates {
            match patch {
                Patch::QueryFieldHasChanged(value) => self.query_field_has_changed = value,
                Patch::MovieQuery(value) => self.movie_query = value,
                Patch::Results(value) => self.results = Some(value),
                Patch::MovieTitle(value) => self.movie_title = Some(value),
                Patch::MovieDetails(value) => self.movie_details = Some(value),
                Patch::Cast(value) => self.cast = Some(value),
                Patch::TimerId(value) => self.timer_id = Some(value),
            }
        }
    }
}
