//! Command-line client for the HarmonyAI backend: composes tracks through
//! the relay and manages the locally stored history and preferences.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harmonyai_relay::client::{ClientEnv, ClientStore, ComposeOptions, RelayClient};
use harmonyai_relay::composition::{Composition, CompositionRequest, Emotion, Feedback, Genre};

fn parse_emotion(s: &str) -> Result<Emotion> {
    Ok(s.parse()?)
}

fn parse_genre(s: &str) -> Result<Genre> {
    Ok(s.parse()?)
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".harmonyai"),
        None => PathBuf::from(".harmonyai"),
    }
}

#[derive(Parser, Debug)]
#[command(name = "cli-compose")]
struct CliArgs {
    /// Directory holding the history and settings files.
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sends lyrics to the composer and stores the result in the history.
    Compose {
        /// Lyrics text; pass "-" to read from standard input.
        lyrics: String,

        #[clap(long, value_parser = parse_emotion)]
        emotion: Option<Emotion>,

        #[clap(long, value_parser = parse_genre)]
        genre: Option<Genre>,

        /// Beats per minute, 60-180.
        #[clap(long)]
        tempo: Option<u32>,

        /// Overrides the Composer API base URL for this run.
        #[clap(long)]
        api_base_url: Option<String>,

        /// Origin to resolve same-origin candidates against.
        #[clap(long)]
        origin: Option<String>,
    },

    /// Lists stored compositions, newest first.
    History {
        /// Only show favorites.
        #[clap(long)]
        favorites: bool,
    },

    /// Toggles the favorite flag on a stored composition.
    Favorite { id: String },

    /// Attaches a rating and optional comment to a stored composition.
    Feedback {
        id: String,

        /// Rating from 1 to 5.
        #[clap(long)]
        rating: u8,

        #[clap(long, default_value = "")]
        comment: String,
    },

    /// Shows stored preferences, or updates the ones passed as flags.
    Settings {
        #[clap(long)]
        api_base_url: Option<String>,

        #[clap(long)]
        default_tempo: Option<u32>,

        #[clap(long, value_parser = parse_genre)]
        default_genre: Option<Genre>,

        #[clap(long, value_parser = parse_emotion)]
        default_emotion: Option<Emotion>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let cli_args = CliArgs::parse();
    let store = ClientStore::new(cli_args.data_dir.unwrap_or_else(default_data_dir));

    match cli_args.command {
        Command::Compose {
            lyrics,
            emotion,
            genre,
            tempo,
            api_base_url,
            origin,
        } => {
            let settings = store.load_settings();

            let lyrics = if lyrics == "-" {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                lyrics
            };

            let request = CompositionRequest {
                lyrics,
                emotion: emotion.unwrap_or(settings.default_emotion),
                genre: genre.unwrap_or(settings.default_genre),
                tempo: tempo.unwrap_or(settings.default_tempo),
            };
            request.validate()?;

            let env = origin.map(ClientEnv::with_origin).unwrap_or_default();
            let stored_base =
                Some(settings.api_base_url.clone()).filter(|url| !url.trim().is_empty());
            let options = ComposeOptions {
                preferred_base_url: api_base_url.or_else(|| stored_base.clone()),
            };

            let relay = RelayClient::new(env, stored_base);
            let result = relay.compose(&request, &options).await?;

            let composition = Composition::new(request, result);
            store.append_composition(composition.clone())?;

            println!("Track ready! Enjoy your new composition.");
            println!("  audio: {}", composition.result.audio);
            println!("  midi:  {}", composition.result.midi);
            println!("  sheet: {}", composition.result.pdf);
            println!("  id:    {}", composition.id);
        }

        Command::History { favorites } => {
            let history = store.load_history();
            let mut shown = 0;
            for entry in history.iter().filter(|c| !favorites || c.favorite) {
                let star = if entry.favorite { "*" } else { " " };
                println!(
                    "{} {}  {}  {} / {} @ {} bpm",
                    star,
                    entry.id,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.request.genre,
                    entry.request.emotion,
                    entry.request.tempo
                );
                shown += 1;
            }
            if shown == 0 {
                println!("No compositions stored yet.");
            }
        }

        Command::Favorite { id } => {
            let favorite = store.toggle_favorite(&id)?;
            if favorite {
                println!("Added to favorites.");
            } else {
                println!("Removed from favorites.");
            }
        }

        Command::Feedback {
            id,
            rating,
            comment,
        } => {
            let feedback = Feedback::new(rating, comment)?;
            store.record_feedback(&id, feedback)?;
            println!("Your thoughts inspire our harmony!");
        }

        Command::Settings {
            api_base_url,
            default_tempo,
            default_genre,
            default_emotion,
        } => {
            let updating = api_base_url.is_some()
                || default_tempo.is_some()
                || default_genre.is_some()
                || default_emotion.is_some();

            let settings = if updating {
                let updated = store.update_settings(|settings| {
                    if let Some(url) = api_base_url {
                        settings.api_base_url = url;
                    }
                    if let Some(tempo) = default_tempo {
                        settings.default_tempo = tempo;
                    }
                    if let Some(genre) = default_genre {
                        settings.default_genre = genre;
                    }
                    if let Some(emotion) = default_emotion {
                        settings.default_emotion = emotion;
                    }
                })?;
                println!("Preferences saved successfully!");
                updated
            } else {
                store.load_settings()
            };

            println!("  default tempo:   {} bpm", settings.default_tempo);
            println!("  default genre:   {}", settings.default_genre);
            println!("  default emotion: {}", settings.default_emotion);
            println!(
                "  composer API:    {}",
                if settings.api_base_url.is_empty() {
                    "(auto)"
                } else {
                    &settings.api_base_url
                }
            );
        }
    }

    Ok(())
}
