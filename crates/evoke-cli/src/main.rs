use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use evoke_service::{Config, RetrievalService};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "evoke", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the dataset directory (default: ~/.local/share/evoke/data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the audio embedding model service
    #[arg(long, global = true)]
    ml_url: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Analyze an audio clip and show matching images
    ///
    /// Uploads the clip to the embedding model, which returns an embedding in
    /// the shared image space and four mood readings (energy, valence, tempo,
    /// texture). The catalog is then ranked by Euclidean distance to that
    /// embedding and the 20 closest images are shown.
    ///
    /// Supported formats: MP3, WAV, OGG, FLAC
    ///
    /// Use --json to get the full response, including the embedding, which
    /// can be fed back into 'evoke refine --embedding'.
    Analyze {
        /// Path to the audio clip
        audio: PathBuf,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Steer an embedding by mood and show matching images
    ///
    /// Each slider moves the embedding along that mood's direction vector;
    /// 0.5 leaves the axis untouched. Values outside 0..1 are accepted and
    /// push further. All four sliders are required.
    Refine {
        /// JSON file holding the embedding (an array, or an analyze response); '-' reads stdin
        #[arg(long, required_unless_present = "from_demo", conflicts_with = "from_demo")]
        embedding: Option<PathBuf>,

        /// Start from the demo fixture's embedding
        #[arg(long)]
        from_demo: bool,

        #[arg(long, allow_negative_numbers = true)]
        energy: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        valence: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        tempo: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        texture: Option<f64>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or build the precomputed demo
    Demo {
        #[command(subcommand)]
        action: Option<DemoAction>,
    },
    /// Check catalog and embedding model health
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dataset statistics
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum DemoAction {
    /// Show the demo fixture (default)
    Show {
        /// Print the fixture as JSON
        #[arg(long)]
        json: bool,
    },
    /// Precompute a demo fixture and write it to the dataset
    ///
    /// With --audio, the clip is analyzed by the embedding model. Without it,
    /// the fixture is centered on the catalog with neutral mood.
    Build {
        /// Audio clip to analyze
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Where to write the fixture (default: <data-dir>/demo.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_overrides(cli.data_dir, cli.ml_url)?;

    if let Err(e) = twyg::setup(config.logging.clone()) {
        eprintln!("Warning: could not set up logging: {:?}", e);
    }

    match cli.command {
        Commands::Analyze { audio, json } => {
            let service = RetrievalService::from_config(&config)?;
            commands::run_analyze(&service, &audio, json).await?;
        }
        Commands::Refine {
            embedding,
            from_demo,
            energy,
            valence,
            tempo,
            texture,
            json,
        } => {
            let service = RetrievalService::from_config(&config)?;
            let source = match embedding {
                Some(path) if !from_demo => commands::EmbeddingSource::File(path),
                _ => commands::EmbeddingSource::Demo,
            };
            let sliders = commands::SliderArgs {
                energy,
                valence,
                tempo,
                texture,
            };
            commands::run_refine(&service, source, sliders, json)?;
        }
        Commands::Demo { action } => {
            let service = RetrievalService::from_config(&config)?;
            match action.unwrap_or(DemoAction::Show { json: false }) {
                DemoAction::Show { json } => commands::show_demo(&service, json)?,
                DemoAction::Build { audio, output } => {
                    let output = output
                        .unwrap_or_else(|| config.data_dir.join(evoke_core::dataset::DEMO_FILE));
                    commands::build_demo(&service, audio.as_deref(), &output).await?;
                }
            }
        }
        Commands::Health { json } => {
            let service = RetrievalService::from_config(&config)?;
            commands::run_health(&service, json).await?;
        }
        Commands::Status => {
            let service = RetrievalService::from_config(&config)?;
            commands::show_status(&service, &config);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config),
            ConfigAction::Get { key } => commands::config::get_config(&config, key)?,
            ConfigAction::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
