// ABOUTME: Movie catalog access: query-slug construction, payload types, and the TMDB HTTP client.
// ABOUTME: Defines the Catalog trait the dispatcher calls; implementations must not touch the machine directly.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CatalogConfig;

/// Request slug used when the query field is empty.
pub const DISCOVERY_REQUEST: &str = "/movie/popular?language=en-US&page=1";

/// Map the free-text query to a catalog request slug. An empty query browses
/// popular movies instead of searching for the empty string.
pub fn make_query_slug(query: &str) -> String {
    if query.is_empty() {
        DISCOVERY_REQUEST.to_string()
    } else {
        format!("/search/movie?query={query}")
    }
}

/// One row of a search result list. Only the fields the UI shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// A page of search results as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_results: u32,
}

/// Detail payload for a single movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// One cast credit of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

/// Credits payload; only the cast list is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Asynchronous movie catalog the dispatcher queries. Completions re-enter
/// the machine as events, never as direct calls.
pub trait Catalog: Send + Sync + 'static {
    fn search(&self, slug: &str) -> impl Future<Output = Result<SearchPage, CatalogError>> + Send;
    fn movie_details(&self, movie_id: u64) -> impl Future<Output = Result<MovieDetails, CatalogError>> + Send;
    fn movie_credits(&self, movie_id: u64) -> impl Future<Output = Result<Credits, CatalogError>> + Send;
}

/// Catalog backed by the TMDB v3 HTTP API.
pub struct TmdbCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbCatalog {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
        }
    }

    /// Turn a relative request slug into a full URL with the API key spliced
    /// in ahead of any query string the slug already carries.
    fn svc_url(&self, slug: &str) -> String {
        match slug.split_once('?') {
            Some((path, query)) => {
                format!("{}{}?api_key={}&{}", self.base_url, path, self.api_key, query)
            }
            None => format!("{}{}?api_key={}&", self.base_url, slug, self.api_key),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, slug: &str) -> Result<T, CatalogError> {
        let url = self.svc_url(slug);
        tracing::debug!("GET {slug}");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

impl Catalog for TmdbCatalog {
    async fn search(&self, slug: &str) -> Result<SearchPage, CatalogError> {
        self.get_json(slug).await
    }

    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails, CatalogError> {
        self.get_json(&format!("/movie/{movie_id}")).await
    }

    async fn movie_credits(&self, movie_id: u64) -> Result<Credits, CatalogError> {
        self.get_json(&format!("/movie/{movie_id}/credits")).await
    }
}
