use clap::{Parser, Subcommand};
use music_to_style::{
    analyze_taste, random_state, recommend_tracks, AnalysisParser, OpenAiClient, SpotifyClient,
    TimeRange,
};
use std::io::Read;

/// Spotify taste analysis and style recommendations
#[derive(Parser)]
#[command(
    name = "music-to-style",
    about = "Analyze Spotify listening history into style and music recommendations",
    long_about = None
)]
struct Cli {
    /// Spotify listening window: short_term, medium_term, or long_term
    #[arg(long, global = true, default_value = "medium_term")]
    time_range: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Spotify authorization URL to open in a browser
    LoginUrl {
        /// OAuth redirect URI registered with the Spotify app
        #[arg(long, default_value = "http://localhost:3000/callback")]
        redirect_uri: String,
    },
    /// Exchange an authorization code for access and refresh tokens
    ExchangeCode {
        /// The code from the OAuth callback
        code: String,
        /// OAuth redirect URI used in the authorization request
        #[arg(long, default_value = "http://localhost:3000/callback")]
        redirect_uri: String,
    },
    /// Show the authenticated user's profile
    Profile,
    /// List the user's top tracks for the time range
    TopTracks {
        /// Maximum number of tracks to fetch
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Run the full taste analysis and print the dashboard payload
    Analyze,
    /// Generate music recommendations and print the dashboard payload
    Recommend {
        /// Number of song suggestions to request
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Parse saved completion text from a file (or stdin) without any
    /// network calls
    ParseAnalysis {
        /// File containing the generated text; reads stdin when omitted
        file: Option<std::path::PathBuf>,
    },
}

fn require_env(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            eprintln!("❌ Error: {name} is not set");
            eprintln!();
            eprintln!("Set it in your environment or in a .env file:");
            eprintln!("  echo '{name}=...' >> .env");
            std::process::exit(1);
        }
    }
}

fn spotify_client() -> SpotifyClient {
    let client_id = require_env("SPOTIFY_CLIENT_ID");
    let client_secret = require_env("SPOTIFY_CLIENT_SECRET");
    SpotifyClient::new(
        Box::new(http_client::native::NativeClient::new()),
        client_id,
        client_secret,
    )
}

fn openai_client() -> OpenAiClient {
    let api_key = require_env("OPENAI_API_KEY");
    match OpenAiClient::new(Box::new(http_client::native::NativeClient::new()), api_key) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create completion client: {e}");
            std::process::exit(1);
        }
    }
}

fn read_input(file: Option<std::path::PathBuf>) -> music_to_style::Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Cli::parse();
    let time_range = TimeRange::from_param(&args.time_range);

    match args.command {
        Commands::LoginUrl { redirect_uri } => {
            let state = random_state(16);
            let url = spotify_client().authorize_url(&redirect_uri, &state);
            println!("{url}");
            eprintln!("🔐 state: {state}");
        }
        Commands::ExchangeCode { code, redirect_uri } => {
            let tokens = spotify_client().exchange_code(&code, &redirect_uri).await?;
            eprintln!("✅ Tokens valid until {}", tokens.expires_at());
            print_json(&tokens);
        }
        Commands::Profile => {
            use music_to_style::SpotifyApi;
            let token = require_env("SPOTIFY_ACCESS_TOKEN");
            let profile = spotify_client().profile(&token).await?;
            print_json(&profile);
        }
        Commands::TopTracks { limit } => {
            use music_to_style::SpotifyApi;
            let token = require_env("SPOTIFY_ACCESS_TOKEN");
            let tracks = spotify_client()
                .top_tracks(&token, time_range, limit)
                .await?;
            print_json(&tracks);
        }
        Commands::Analyze => {
            let token = require_env("SPOTIFY_ACCESS_TOKEN");
            let spotify = spotify_client();
            let completions = openai_client();
            let analysis = analyze_taste(&spotify, &completions, &token, time_range).await?;
            print_json(&analysis);
        }
        Commands::Recommend { limit } => {
            let token = require_env("SPOTIFY_ACCESS_TOKEN");
            let spotify = spotify_client();
            let completions = openai_client();
            let recommendations =
                recommend_tracks(&spotify, &completions, &token, time_range, limit).await?;
            print_json(&recommendations);
        }
        Commands::ParseAnalysis { file } => {
            let text = read_input(file)?;
            let parser = AnalysisParser::new();
            let payload = serde_json::json!({
                "analysis": parser.strip_style_recommendations(&text),
                "styleRecommendations": parser.parse_style_recommendations(&text),
                "songSuggestions": parser.parse_song_suggestions(&text),
            });
            print_json(&payload);
        }
    }

    Ok(())
}
