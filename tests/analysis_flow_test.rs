//! Flow tests for the analysis functions against canned collaborators.
//!
//! `StubSpotify` and `StubCompletions` implement the client traits over
//! in-memory data, so the full analyze/recommend pipelines run with no
//! network traffic.

use async_trait::async_trait;
use music_to_style::completion::CompletionRequest;
use music_to_style::{
    analyze_taste, recommend_tracks, CompletionProvider, Error, Result, SpotifyApi, TimeRange,
    Track, UserProfile,
};
use std::cell::RefCell;
use std::collections::HashMap;

fn track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![artist.to_string()],
        album: format!("{name} LP"),
        popularity: 60,
        explicit: false,
        url: None,
    }
}

#[derive(Default)]
struct StubSpotify {
    top: Vec<Track>,
    /// Exact search query -> result. Queries not present return no match;
    /// a query in `failing_queries` errors instead.
    search: HashMap<String, Track>,
    failing_queries: Vec<String>,
    seen_queries: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl SpotifyApi for StubSpotify {
    async fn profile(&self, _access_token: &str) -> Result<UserProfile> {
        Ok(UserProfile {
            id: "stub-user".to_string(),
            display_name: "Stub User".to_string(),
            email: None,
            country: None,
        })
    }

    async fn top_tracks(
        &self,
        _access_token: &str,
        _time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Track>> {
        Ok(self.top.iter().take(limit as usize).cloned().collect())
    }

    async fn search_track(&self, _access_token: &str, query: &str) -> Result<Option<Track>> {
        self.seen_queries.borrow_mut().push(query.to_string());
        if self.failing_queries.iter().any(|q| q == query) {
            return Err(Error::Http("stub network failure".to_string()));
        }
        Ok(self.search.get(query).cloned())
    }
}

struct StubCompletions {
    response: String,
    prompts: RefCell<Vec<String>>,
}

impl StubCompletions {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl CompletionProvider for StubCompletions {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        self.prompts.borrow_mut().push(request.user.to_string());
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn analyze_taste_builds_dashboard_payload() {
    let spotify = StubSpotify {
        top: vec![track("t1", "Blue", "Joni Mitchell")],
        ..Default::default()
    };
    let completions = StubCompletions::new(
        "You have taste, which makes you insufferable.\n\
         [STYLE_RECOMMENDATIONS]\n\
         CATEGORY: clothing\n\
         ITEMS: turtleneck, corduroy pants\n\
         STYLE: canyon folk professor\n\
         [/STYLE_RECOMMENDATIONS]",
    );

    let analysis = analyze_taste(&spotify, &completions, "token", TimeRange::Short)
        .await
        .unwrap();

    assert!(analysis.success);
    assert_eq!(analysis.tracks_analyzed, 1);
    assert_eq!(analysis.time_range, "the last 4 weeks");
    assert_eq!(analysis.analysis, "You have taste, which makes you insufferable.");
    assert_eq!(analysis.style_recommendations.len(), 1);
    assert_eq!(analysis.style_recommendations[0].category, "clothing");
    assert_eq!(analysis.style_recommendations[0].links.len(), 2);

    // The prompt carried the user's name and their track.
    let prompts = completions.prompts.borrow();
    assert!(prompts[0].contains("Stub User"));
    assert!(prompts[0].contains("\"Blue\" by Joni Mitchell"));
}

#[tokio::test]
async fn analyze_taste_without_history_errors() {
    let spotify = StubSpotify::default();
    let completions = StubCompletions::new("unused");

    match analyze_taste(&spotify, &completions, "token", TimeRange::Medium).await {
        Err(Error::NoTracks) => {}
        other => panic!("Expected NoTracks, got: {other:?}"),
    }
}

#[tokio::test]
async fn analyze_taste_with_unstructured_response_still_succeeds() {
    let spotify = StubSpotify {
        top: vec![track("t1", "Blue", "Joni Mitchell")],
        ..Default::default()
    };
    let completions = StubCompletions::new("Just a roast. No markers at all.");

    let analysis = analyze_taste(&spotify, &completions, "token", TimeRange::Long)
        .await
        .unwrap();
    assert!(analysis.style_recommendations.is_empty());
    assert_eq!(analysis.analysis, "Just a roast. No markers at all.");
}

#[tokio::test]
async fn recommend_tracks_resolves_and_dedups_by_id() {
    let mut search = HashMap::new();
    // Two different suggestions resolve to the same Spotify track.
    search.insert("Holland Nilsson Sings".to_string(), track("same", "Holland", "X"));
    search.insert("Gouge Away Pixies".to_string(), track("same", "Holland", "X"));
    search.insert("Pink Moon Nick Drake".to_string(), track("p1", "Pink Moon", "Nick Drake"));

    let spotify = StubSpotify {
        top: vec![
            track("t1", "One", "A"),
            track("t2", "Two", "B"),
            track("t3", "Three", "C"),
        ],
        search,
        ..Default::default()
    };
    let completions = StubCompletions::new(
        "SONG: Holland\nARTIST: Nilsson Sings\n\
         SONG: Gouge Away\nARTIST: Pixies\n\
         SONG: Pink Moon\nARTIST: Nick Drake",
    );

    let result = recommend_tracks(&spotify, &completions, "token", TimeRange::Medium, 3)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.ai_suggestions.len(), 3);
    // "same" appears once despite two suggestions resolving to it.
    assert_eq!(result.recommendations.len(), 2);
    assert_eq!(result.recommendations[0].id, "same");
    assert_eq!(result.recommendations[1].id, "p1");
    // Seed tracks are the first two top tracks.
    assert_eq!(result.seed_tracks.len(), 2);
    assert_eq!(result.seed_tracks[0].id, "t1");

    // One search per suggestion, query = "song artist".
    let queries = spotify.seen_queries.borrow();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0], "Holland Nilsson Sings");
}

#[tokio::test]
async fn recommend_tracks_skips_failed_searches() {
    let mut search = HashMap::new();
    search.insert("Good Song Good Band".to_string(), track("g", "Good Song", "Good Band"));

    let spotify = StubSpotify {
        top: vec![track("t1", "One", "A")],
        search,
        failing_queries: vec!["Bad Song Bad Band".to_string()],
        ..Default::default()
    };
    let completions = StubCompletions::new(
        "SONG: Bad Song\nARTIST: Bad Band\nSONG: Good Song\nARTIST: Good Band",
    );

    let result = recommend_tracks(&spotify, &completions, "token", TimeRange::Medium, 2)
        .await
        .unwrap();

    // The failed search is skipped, not fatal.
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].id, "g");
    assert_eq!(result.ai_suggestions.len(), 2);
}

#[tokio::test]
async fn recommend_tracks_without_history_errors() {
    let spotify = StubSpotify::default();
    let completions = StubCompletions::new("unused");

    match recommend_tracks(&spotify, &completions, "token", TimeRange::Medium, 5).await {
        Err(Error::NoTracks) => {}
        other => panic!("Expected NoTracks, got: {other:?}"),
    }
}

#[tokio::test]
async fn suggestion_with_empty_artist_searches_song_only() {
    let mut search = HashMap::new();
    search.insert("Solo".to_string(), track("s", "Solo", "Unknown"));

    let spotify = StubSpotify {
        top: vec![track("t1", "One", "A")],
        search,
        ..Default::default()
    };
    // Orphan ARTIST is dropped; the trailing query is just the title.
    let completions = StubCompletions::new("ARTIST: Orphan\nSONG: Solo");

    let result = recommend_tracks(&spotify, &completions, "token", TimeRange::Medium, 1)
        .await
        .unwrap();

    assert_eq!(result.ai_suggestions.len(), 1);
    assert_eq!(result.ai_suggestions[0].artist, "");
    assert_eq!(result.recommendations.len(), 1);
    let queries = spotify.seen_queries.borrow();
    assert_eq!(queries[0], "Solo");
}
