//! High-level analysis and recommendation flows.
//!
//! These functions wire the collaborators together: Spotify supplies the
//! listening history, the completion provider generates the free-text
//! response, and the parsing core turns that text into the structured
//! payloads the dashboard renders. Both collaborators are trait objects, so
//! the flows run unchanged against canned data in tests.

use crate::client::SpotifyApi;
use crate::completion::{CompletionProvider, CompletionRequest};
use crate::error::Error;
use crate::parsing::AnalysisParser;
use crate::prompt::{
    song_suggestion_prompt, taste_analysis_prompt, SONG_SUGGESTION_SYSTEM_PROMPT,
    TASTE_ANALYSIS_SYSTEM_PROMPT,
};
use crate::types::{Recommendations, TasteAnalysis, TimeRange};
use crate::Result;
use std::collections::HashSet;

/// How many top tracks feed the taste analysis.
const ANALYSIS_TRACK_LIMIT: u32 = 50;

/// How many top tracks seed the song suggestions.
const SUGGESTION_SEED_LIMIT: u32 = 20;

/// Analyze the user's taste and extract style recommendations.
///
/// Fetches the profile and top tracks for the window, asks the completion
/// provider for a critique ending in the marker-delimited recommendation
/// block, then splits the response into display prose and structured
/// records. The marker region is stripped from the prose so the dashboard
/// shows only the critic's text.
///
/// Returns [`Error::NoTracks`] when the window has no listening history.
pub async fn analyze_taste(
    spotify: &dyn SpotifyApi,
    completions: &dyn CompletionProvider,
    access_token: &str,
    time_range: TimeRange,
) -> Result<TasteAnalysis> {
    let profile = spotify.profile(access_token).await?;
    let tracks = spotify
        .top_tracks(access_token, time_range, ANALYSIS_TRACK_LIMIT)
        .await?;

    if tracks.is_empty() {
        return Err(Error::NoTracks);
    }

    log::info!(
        "Analyzing {} tracks for '{}' over {}",
        tracks.len(),
        profile.display_name,
        time_range.human_readable()
    );

    let prompt = taste_analysis_prompt(&profile.display_name, &tracks, time_range);
    let request = CompletionRequest::new(TASTE_ANALYSIS_SYSTEM_PROMPT, &prompt, 1000);
    let analysis = completions.complete(&request).await?;

    let parser = AnalysisParser::new();
    let style_recommendations = parser.parse_style_recommendations(&analysis);
    let clean_analysis = parser.strip_style_recommendations(&analysis);

    Ok(TasteAnalysis {
        success: true,
        analysis: clean_analysis,
        style_recommendations,
        tracks_analyzed: tracks.len(),
        time_range: time_range.human_readable().to_string(),
    })
}

/// Generate music recommendations from the user's top tracks.
///
/// Asks the completion provider for `(song, artist)` suggestions, parses
/// them, and resolves each against Spotify search. Matches are de-duplicated
/// by track id; a failed search for one suggestion is logged and skipped so
/// the remaining suggestions still resolve.
///
/// Returns [`Error::NoTracks`] when the window has no listening history.
pub async fn recommend_tracks(
    spotify: &dyn SpotifyApi,
    completions: &dyn CompletionProvider,
    access_token: &str,
    time_range: TimeRange,
    limit: usize,
) -> Result<Recommendations> {
    let top_tracks = spotify
        .top_tracks(access_token, time_range, SUGGESTION_SEED_LIMIT)
        .await?;

    if top_tracks.is_empty() {
        return Err(Error::NoTracks);
    }

    let prompt = song_suggestion_prompt(&top_tracks, limit);
    let request = CompletionRequest::new(SONG_SUGGESTION_SYSTEM_PROMPT, &prompt, 800);
    let suggestions_text = completions.complete(&request).await?;
    log::debug!("Completion suggestions:\n{suggestions_text}");

    let parser = AnalysisParser::new();
    let suggestions = parser.parse_song_suggestions(&suggestions_text);
    log::info!("Resolving {} song suggestions", suggestions.len());

    let mut recommendations = Vec::new();
    let mut found_track_ids = HashSet::new();

    for suggestion in &suggestions {
        let query = format!("{} {}", suggestion.song, suggestion.artist);
        match spotify.search_track(access_token, query.trim()).await {
            Ok(Some(track)) => {
                if found_track_ids.insert(track.id.clone()) {
                    recommendations.push(track);
                }
            }
            Ok(None) => {
                log::debug!("No match for '{}' by '{}'", suggestion.song, suggestion.artist);
            }
            Err(e) => {
                log::warn!(
                    "Search failed for '{}' by '{}': {e}",
                    suggestion.song,
                    suggestion.artist
                );
            }
        }
    }

    let seed_tracks = top_tracks.into_iter().take(2).collect();

    Ok(Recommendations {
        success: true,
        recommendations,
        seed_tracks,
        ai_suggestions: suggestions,
    })
}
