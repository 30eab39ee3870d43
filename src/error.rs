use thiserror::Error;

/// Error types for Spotify and completion-API operations.
///
/// This enum covers everything that can go wrong while talking to the
/// upstream services: network failures, authentication problems, rejected
/// API calls, and malformed responses.
///
/// Note that the response-parsing core ([`crate::parsing`]) and the link
/// synthesizer ([`crate::links`]) never produce these errors. Both are total
/// functions over arbitrary input text; garbled generated text degrades to
/// empty output, not to an `Err`.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use music_to_style::{Error, SpotifyApi, SpotifyClient};
///
/// # tokio_test::block_on(async {
/// let client = SpotifyClient::new(
///     Box::new(http_client::native::NativeClient::new()),
///     "client_id".to_string(),
///     "client_secret".to_string(),
/// );
///
/// match client.profile("access-token").await {
///     Ok(profile) => println!("Hello, {}", profile.display_name),
///     Err(Error::Auth(msg)) => eprintln!("Token rejected: {}", msg),
///     Err(Error::RateLimit { retry_after }) => {
///         eprintln!("Rate limited, retry in {} seconds", retry_after);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # });
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, timeouts, DNS errors, and other
    /// low-level networking issues.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication failures.
    ///
    /// Returned when the OAuth code exchange is rejected or when an API call
    /// is made with a missing, expired, or revoked access token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An upstream API rejected the request.
    ///
    /// Any non-success status that is not an auth failure or a rate limit
    /// ends up here, with the upstream body preserved for diagnostics.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the upstream service
        status: u16,
        /// Response body or error description from the upstream service
        message: String,
    },

    /// Rate limiting from an upstream service.
    ///
    /// Spotify returns 429 with a `Retry-After` header when request quotas
    /// are exceeded. The client surfaces this without retrying; callers
    /// decide whether to wait.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// Failed to decode an upstream JSON response.
    ///
    /// This indicates the service returned a payload that does not match
    /// the documented shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The user has no listening history in the requested time window.
    ///
    /// Analysis and recommendation flows need at least one top track to
    /// build a prompt from.
    #[error("No tracks found in this time range")]
    NoTracks,

    /// A required credential or endpoint is not configured.
    ///
    /// For example, calling the completion API without an API key set.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// File system I/O errors.
    ///
    /// Produced when reading saved completion text from disk or stdin.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
