//! Spotify listening-history analysis with AI style recommendations.
//!
//! This crate authenticates a user against Spotify, feeds their top tracks
//! to a completion API, and parses the free-text response into structured,
//! display-ready payloads: a taste critique with per-category style
//! recommendations (each item carrying an outbound product-search link),
//! and a set of suggested tracks resolved back through Spotify search.
//!
//! The parsing core ([`parsing`] and [`links`]) is pure and total: given any
//! string it produces a structure, never an error. Everything network-facing
//! lives behind the [`SpotifyApi`] and [`CompletionProvider`] traits.

pub mod analysis;
pub mod client;
pub mod completion;
pub mod error;
pub mod links;
pub mod parsing;
pub mod prompt;
pub mod types;

pub use analysis::{analyze_taste, recommend_tracks};
pub use client::{random_state, SpotifyApi, SpotifyClient};
pub use completion::{CompletionProvider, CompletionRequest, OpenAiClient};
pub use error::Error;
pub use links::generate_product_links;
pub use parsing::AnalysisParser;
pub use types::{
    LinkEntry, RecommendationBlock, Recommendations, SongSuggestion, TasteAnalysis, TimeRange,
    TokenResponse, Track, UserProfile,
};

pub type Result<T> = std::result::Result<T, Error>;
