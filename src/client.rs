//! Spotify Web API client.
//!
//! Handles the OAuth authorization-code flow and the bearer-token API calls
//! the analysis flows need: profile, top tracks, and track search. The
//! client is stateless with respect to user tokens; every call carries the
//! access token explicitly, and nothing is cached between requests.

use crate::error::Error;
use crate::types::{TimeRange, TokenResponse, Track, UserProfile};
use crate::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

/// Default base URL for the Spotify Web API.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Default base URL for Spotify's accounts service (OAuth endpoints).
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// OAuth scopes requested during authorization.
pub const OAUTH_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-read-recently-played",
];

/// Generate a random alphanumeric string for the OAuth `state` parameter.
#[must_use]
pub fn random_state(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Trait for the Spotify operations the analysis flows depend on.
///
/// Abstracting the client behind this trait lets the flows in
/// [`crate::analysis`] run against canned data in tests without any network
/// traffic.
#[async_trait(?Send)]
pub trait SpotifyApi {
    /// Fetch the authenticated user's profile.
    async fn profile(&self, access_token: &str) -> Result<UserProfile>;

    /// Fetch the user's top tracks for the given listening window.
    async fn top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Track>>;

    /// Search for a track, returning the best match if any.
    async fn search_track(&self, access_token: &str, query: &str) -> Result<Option<Track>>;
}

/// Client for the Spotify Web API.
///
/// # Examples
///
/// ```rust,no_run
/// use music_to_style::{Result, SpotifyApi, SpotifyClient, TimeRange};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = SpotifyClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         "client_id".to_string(),
///         "client_secret".to_string(),
///     );
///
///     let tracks = client
///         .top_tracks("access-token", TimeRange::Medium, 20)
///         .await?;
///     println!("Got {} tracks", tracks.len());
///
///     Ok(())
/// }
/// ```
pub struct SpotifyClient {
    client: Box<dyn HttpClient>,
    client_id: String,
    client_secret: String,
    api_base_url: String,
    accounts_base_url: String,
}

impl SpotifyClient {
    /// Create a new [`SpotifyClient`] against the real Spotify endpoints.
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    /// * `client_id` - Spotify application client id
    /// * `client_secret` - Spotify application client secret
    pub fn new(client: Box<dyn HttpClient>, client_id: String, client_secret: String) -> Self {
        Self::with_base_urls(
            client,
            client_id,
            client_secret,
            API_BASE_URL.to_string(),
            ACCOUNTS_BASE_URL.to_string(),
        )
    }

    /// Create a client with custom API and accounts base URLs.
    ///
    /// Useful for pointing at a local stub server in tests.
    pub fn with_base_urls(
        client: Box<dyn HttpClient>,
        client_id: String,
        client_secret: String,
        api_base_url: String,
        accounts_base_url: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            api_base_url,
            accounts_base_url,
        }
    }

    /// Build the authorization URL the user's browser is redirected to.
    ///
    /// The returned URL carries the response type, client id, the scopes in
    /// [`OAUTH_SCOPES`], the redirect URI, and the caller-supplied `state`.
    #[must_use]
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        let scope = OAUTH_SCOPES.join(" ");
        format!(
            "{}/authorize?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.accounts_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// Sends the code with HTTP Basic client credentials to the accounts
    /// service, as required by the authorization-code grant.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let token_url = format!("{}/api/token", self.accounts_base_url);

        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        let form = format!(
            "grant_type=authorization_code&code={}&redirect_uri={}",
            urlencoding::encode(code),
            urlencoding::encode(redirect_uri),
        );

        let mut request = Request::new(Method::Post, token_url.parse::<Url>().unwrap());
        request.insert_header(
            "Authorization",
            format!("Basic {}", BASE64.encode(credentials.as_bytes())),
        );
        request.insert_header("Content-Type", "application/x-www-form-urlencoded");
        request.set_body(form);

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let body = read_checked_body(response).await.map_err(|e| match e {
            // The accounts service answers a bad or reused code with 400.
            Error::Api { status: 400, message } => Error::Auth(message),
            other => other,
        })?;

        parse_token_response(&body)
    }

    /// Issue an authenticated GET and return the response body.
    async fn get_api(&self, path_and_query: &str, access_token: &str) -> Result<String> {
        let url = format!("{}{path_and_query}", self.api_base_url);
        log::debug!("GET {url}");

        let mut request = Request::new(Method::Get, url.parse::<Url>().unwrap());
        request.insert_header("Authorization", format!("Bearer {access_token}"));

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        read_checked_body(response).await
    }
}

#[async_trait(?Send)]
impl SpotifyApi for SpotifyClient {
    async fn profile(&self, access_token: &str) -> Result<UserProfile> {
        let body = self.get_api("/me", access_token).await?;
        parse_profile_response(&body)
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Track>> {
        let path = format!(
            "/me/top/tracks?time_range={}&limit={limit}",
            time_range.as_str()
        );
        let body = self.get_api(&path, access_token).await?;
        parse_top_tracks_response(&body)
    }

    async fn search_track(&self, access_token: &str, query: &str) -> Result<Option<Track>> {
        let path = format!("/search?q={}&type=track&limit=1", urlencoding::encode(query));
        let body = self.get_api(&path, access_token).await?;
        parse_search_response(&body)
    }
}

/// Read the response body and map non-success statuses onto the error
/// taxonomy: 401 → [`Error::Auth`], 429 → [`Error::RateLimit`], everything
/// else non-2xx → [`Error::Api`].
async fn read_checked_body(mut response: Response) -> Result<String> {
    let status: u16 = response.status().into();

    if response.status() == 429 {
        let retry_after = response
            .header("retry-after")
            .and_then(|h| h.get(0))
            .and_then(|v| v.as_str().parse::<u64>().ok())
            .unwrap_or(60);
        return Err(Error::RateLimit { retry_after });
    }

    let body = response
        .body_string()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    if response.status() == 401 {
        return Err(Error::Auth("Access token missing or expired".to_string()));
    }
    if !response.status().is_success() {
        log::debug!("Upstream returned {status}: {body}");
        return Err(Error::Api {
            status,
            message: body,
        });
    }

    Ok(body)
}

// =============================================================================
// Spotify API response shapes
// =============================================================================

#[derive(Deserialize)]
struct ApiTopTracksResponse {
    items: Vec<ApiTrack>,
}

#[derive(Deserialize)]
struct ApiSearchResponse {
    tracks: ApiSearchTracks,
}

#[derive(Deserialize)]
struct ApiSearchTracks {
    items: Vec<ApiTrack>,
}

#[derive(Deserialize)]
struct ApiTrack {
    id: String,
    name: String,
    artists: Vec<ApiArtist>,
    album: ApiAlbum,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    explicit: bool,
    external_urls: Option<ApiExternalUrls>,
}

#[derive(Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize)]
struct ApiAlbum {
    name: String,
}

#[derive(Deserialize)]
struct ApiExternalUrls {
    spotify: Option<String>,
}

#[derive(Deserialize)]
struct ApiProfile {
    id: String,
    display_name: Option<String>,
    email: Option<String>,
    country: Option<String>,
}

impl From<ApiTrack> for Track {
    fn from(track: ApiTrack) -> Self {
        Track {
            id: track.id,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album: track.album.name,
            popularity: track.popularity,
            explicit: track.explicit,
            url: track.external_urls.and_then(|u| u.spotify),
        }
    }
}

pub fn parse_top_tracks_response(json: &str) -> Result<Vec<Track>> {
    let response: ApiTopTracksResponse =
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(response.items.into_iter().map(Track::from).collect())
}

pub fn parse_search_response(json: &str) -> Result<Option<Track>> {
    let response: ApiSearchResponse =
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(response.tracks.items.into_iter().next().map(Track::from))
}

pub fn parse_profile_response(json: &str) -> Result<UserProfile> {
    let profile: ApiProfile =
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(UserProfile {
        display_name: profile.display_name.unwrap_or_else(|| profile.id.clone()),
        id: profile.id,
        email: profile.email,
        country: profile.country,
    })
}

pub fn parse_token_response(json: &str) -> Result<TokenResponse> {
    serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_stub() -> Box<dyn HttpClient> {
        Box::new(http_client::native::NativeClient::new())
    }

    fn client() -> SpotifyClient {
        SpotifyClient::new(http_stub(), "my-id".to_string(), "my-secret".to_string())
    }

    #[test]
    fn test_authorize_url_contains_scopes_and_state() {
        let url = client().authorize_url("http://localhost:3000/callback", "abc123");
        assert!(url.starts_with("https://accounts.spotify.com/authorize?response_type=code"));
        assert!(url.contains("client_id=my-id"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("user-read-private%20user-read-email%20user-top-read"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
    }

    #[test]
    fn test_authorize_url_parses_as_url() {
        let url = client().authorize_url("http://localhost:3000/callback", "s");
        assert!(url.parse::<Url>().is_ok());
    }

    #[test]
    fn test_random_state_is_alphanumeric() {
        let state = random_state(16);
        assert_eq!(state.len(), 16);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_parse_top_tracks() {
        let json = r#"{
            "items": [
                {
                    "id": "t1",
                    "name": "Pyramid Song",
                    "artists": [{"name": "Radiohead"}],
                    "album": {"name": "Amnesiac"},
                    "popularity": 70,
                    "explicit": false,
                    "external_urls": {"spotify": "https://open.spotify.com/track/t1"}
                }
            ]
        }"#;

        let tracks = parse_top_tracks_response(json).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Pyramid Song");
        assert_eq!(tracks[0].artists, vec!["Radiohead"]);
        assert_eq!(tracks[0].album, "Amnesiac");
        assert_eq!(
            tracks[0].url.as_deref(),
            Some("https://open.spotify.com/track/t1")
        );
    }

    #[test]
    fn test_parse_search_empty_result() {
        let json = r#"{"tracks": {"items": []}}"#;
        assert_eq!(parse_search_response(json).unwrap(), None);
    }

    #[test]
    fn test_parse_search_first_result() {
        let json = r#"{
            "tracks": {
                "items": [
                    {
                        "id": "t2",
                        "name": "Blue",
                        "artists": [{"name": "Joni Mitchell"}],
                        "album": {"name": "Blue"}
                    }
                ]
            }
        }"#;
        let track = parse_search_response(json).unwrap().unwrap();
        assert_eq!(track.id, "t2");
        // popularity/explicit default when the payload omits them
        assert_eq!(track.popularity, 0);
        assert!(!track.explicit);
    }

    #[test]
    fn test_parse_profile_falls_back_to_id() {
        let json = r#"{"id": "user1", "display_name": null}"#;
        let profile = parse_profile_response(json).unwrap();
        assert_eq!(profile.display_name, "user1");
    }

    #[test]
    fn test_parse_malformed_json_is_parse_error() {
        match parse_top_tracks_response("not json") {
            Err(Error::Parse(_)) => {}
            other => panic!("Expected parse error, got: {other:?}"),
        }
    }
}
