//! Data types for tracks, analysis payloads, and recommendation records.
//!
//! This module contains the core data structures used throughout the crate:
//! Spotify track and profile metadata, OAuth token state, and the structured
//! recommendation records produced by the parsing core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ================================================================================================
// TRACK AND PROFILE METADATA
// ================================================================================================

/// Represents a Spotify track with the metadata the analysis flows care about.
///
/// # Examples
///
/// ```rust
/// use music_to_style::Track;
///
/// let track = Track {
///     id: "6rqhFgbbKwnb9MLmUQDhG6".to_string(),
///     name: "Paranoid Android".to_string(),
///     artists: vec!["Radiohead".to_string()],
///     album: "OK Computer".to_string(),
///     popularity: 77,
///     explicit: false,
///     url: Some("https://open.spotify.com/track/6rqhFgbbKwnb9MLmUQDhG6".to_string()),
/// };
///
/// println!("{} by {}", track.name, track.artist_line());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track id, used for de-duplicating search results
    pub id: String,
    /// The track name/title
    pub name: String,
    /// All credited artist names, in Spotify's order
    pub artists: Vec<String>,
    /// The album name
    pub album: String,
    /// Spotify popularity score (0-100)
    pub popularity: u32,
    /// Whether the track is flagged explicit
    pub explicit: bool,
    /// Public Spotify URL for the track, if available
    pub url: Option<String>,
}

impl Track {
    /// All artist names joined with `", "`, the way they are rendered in
    /// prompts and dashboards.
    #[must_use]
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// The authenticated user's Spotify profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Spotify user id
    pub id: String,
    /// Display name shown on the dashboard and used in prompts
    pub display_name: String,
    /// Account email, if the scope granted access to it
    pub email: Option<String>,
    /// Account country code, if available
    pub country: Option<String>,
}

/// Tokens returned by the OAuth authorization-code exchange.
///
/// Tokens are never persisted by this crate; every API call is stateless and
/// carries the bearer token explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for Spotify Web API calls
    pub access_token: String,
    /// Token used to obtain a fresh access token once this one expires
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

impl TokenResponse {
    /// The wall-clock instant at which the access token expires, measured
    /// from now. Call this immediately after the exchange.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(self.expires_in)
    }
}

/// Time window for "top tracks" queries.
///
/// Spotify's personalization API supports three aggregation windows. The
/// wire values (`short_term` etc.) and the human-readable phrases used in
/// prompts both live here so they cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// Roughly the last 4 weeks
    Short,
    /// Roughly the last 6 months
    #[default]
    Medium,
    /// Several years of listening history
    Long,
}

impl TimeRange {
    /// The query-parameter value Spotify expects.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        }
    }

    /// The phrase used in prompts and in the `timeRange` response field.
    #[must_use]
    pub fn human_readable(&self) -> &'static str {
        match self {
            TimeRange::Short => "the last 4 weeks",
            TimeRange::Medium => "the last 6 months",
            TimeRange::Long => "all time",
        }
    }

    /// Parse a wire value, falling back to [`TimeRange::Medium`] for
    /// anything unrecognized. Upstream requests are user-supplied, so this
    /// is deliberately lenient.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "short_term" => TimeRange::Short,
            "long_term" => TimeRange::Long,
            _ => TimeRange::Medium,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ================================================================================================
// PARSED RECOMMENDATION RECORDS
// ================================================================================================

/// One parsed style-recommendation record.
///
/// Produced by [`crate::AnalysisParser::parse_style_recommendations`] from a
/// single pass over the generated text; immutable afterwards. Serializes to
/// the shape the dashboard consumes:
/// `{category, items, style, links}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBlock {
    /// Category label as written in the generated text (case preserved)
    pub category: String,
    /// Item names in source order; duplicates are kept as written
    pub items: Vec<String>,
    /// Free-form style description; empty when the section had no `STYLE:` line
    pub style: String,
    /// One outbound link per item, same order as `items`
    pub links: Vec<LinkEntry>,
}

/// One synthesized outbound search link.
///
/// The `url` query component, percent-decoded, is exactly `search_term`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// The source item name, verbatim
    pub item: String,
    /// Fully formed outbound search URL including the affiliate tag
    pub url: String,
    /// The augmented query the URL searches for
    #[serde(rename = "searchTerm")]
    pub search_term: String,
}

/// One `(song, artist)` pair reconstructed from the suggestion lines of the
/// generated text.
///
/// `artist` is empty when no `ARTIST:` line arrived before the next `SONG:`
/// line or end of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSuggestion {
    /// Suggested song title, never empty
    pub song: String,
    /// Suggested artist name, may be empty
    pub artist: String,
}

// ================================================================================================
// RESPONSE PAYLOADS
// ================================================================================================

/// Full taste-analysis payload returned to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasteAnalysis {
    /// Always `true` for a payload that was produced at all
    pub success: bool,
    /// The critic's prose with the recommendation markers stripped out
    pub analysis: String,
    /// Structured style recommendations extracted from the same text
    #[serde(rename = "styleRecommendations")]
    pub style_recommendations: Vec<RecommendationBlock>,
    /// How many top tracks fed the analysis
    #[serde(rename = "tracksAnalyzed")]
    pub tracks_analyzed: usize,
    /// Human-readable listening window, e.g. "the last 6 months"
    #[serde(rename = "timeRange")]
    pub time_range: String,
}

/// Music-recommendation payload returned to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    /// Always `true` for a payload that was produced at all
    pub success: bool,
    /// Matched Spotify tracks, de-duplicated by track id
    pub recommendations: Vec<Track>,
    /// The first few top tracks the suggestions were seeded from
    #[serde(rename = "seedTracks")]
    pub seed_tracks: Vec<Track>,
    /// The raw `(song, artist)` pairs the model suggested
    #[serde(rename = "aiSuggestions")]
    pub ai_suggestions: Vec<SongSuggestion>,
}
