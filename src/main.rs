use clap::{Parser, Subcommand};
use prompt2image::client::{GeminiClient, ImageGenerator};
use prompt2image::config::{self, Config};
use prompt2image::error::{Error, Result};
use prompt2image::gallery::{self, PromptLookup};
use prompt2image::repository::FsRepository;
use prompt2image::writer::OutputWriter;
use prompt2image::{output, workflow};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prompt2image")]
#[command(about = "Generate images from prompt files with Gemini and publish a gallery")]
#[command(long_about = "\
Generate images from prompt files with Gemini and publish a gallery

Prompts are plain text files. Every generation is saved next to the others
under a timestamped name, and the gallery page pairs each prompt with the
images generated from it.

Project layout:

  .
  ├── prompt2image.toml            # Optional config (see gen-config)
  ├── prompts/
  │   └── sunset.txt               # Base name: sunset
  ├── outputs/
  │   ├── sunset_20240102_090000.png
  │   └── sunset_20240101_120000.png
  └── docs/
      └── index.html               # Written by 'prompt2image gallery'

The API key is read from GEMINI_API_KEY (configurable) and is only needed
by 'generate' and 'new'.

Run 'prompt2image gen-config' to generate a documented prompt2image.toml.")]
#[command(version)]
struct Cli {
    /// Project root holding prompt2image.toml and the default directories
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Prompts directory (overrides config)
    #[arg(long, global = true)]
    prompts_dir: Option<PathBuf>,

    /// Generated images directory (overrides config)
    #[arg(long, global = true)]
    outputs_dir: Option<PathBuf>,

    /// Gallery HTML file (overrides config)
    #[arg(long, global = true)]
    gallery: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one image from a prompt file
    Generate {
        /// Path to the prompt file
        prompt: PathBuf,
    },
    /// Save an inline prompt to the prompts directory and generate from it
    New {
        /// Prompt text
        text: String,
        /// Base name for the prompt file (default: first three words)
        #[arg(long)]
        name: Option<String>,
    },
    /// Build the static HTML gallery
    Gallery,
    /// Show the prompt an image was generated from
    ViewPrompt {
        /// Image filename, exact or a case-insensitive fragment
        image: String,
    },
    /// Print a stock prompt2image.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Generate { prompt } => {
            let config = load_config(&cli)?;
            let client = build_client(&config)?;
            let writer = OutputWriter::new(&config.paths.outputs_dir);
            output::print_generation_notice(client.model());
            let outcome = block_on(workflow::generate_from_file(prompt, &client, &writer))??;
            if cli.json {
                output::print_json(&outcome)?;
            } else {
                output::print_generate_output(&outcome, &cli.root);
            }
        }
        Command::New { text, name } => {
            let config = load_config(&cli)?;
            let client = build_client(&config)?;
            let writer = OutputWriter::new(&config.paths.outputs_dir);
            output::print_generation_notice(client.model());
            let outcome = block_on(workflow::generate_inline(
                text,
                name.as_deref(),
                &config.paths.prompts_dir,
                &client,
                &writer,
            ))??;
            if cli.json {
                output::print_json(&outcome)?;
            } else {
                output::print_generate_output(&outcome, &cli.root);
            }
        }
        Command::Gallery => {
            let config = load_config(&cli)?;
            let repo = FsRepository::new(&config.paths.prompts_dir, &config.paths.outputs_dir);
            let report = workflow::publish_gallery(&repo, &config)?;
            if cli.json {
                output::print_json(&report)?;
            } else {
                output::print_gallery_output(&report, &cli.root);
            }
        }
        Command::ViewPrompt { image } => {
            let config = load_config(&cli)?;
            let repo = FsRepository::new(&config.paths.prompts_dir, &config.paths.outputs_dir);
            let lookup = gallery::lookup_prompt(&repo, image)?;
            if cli.json {
                output::print_json(&lookup)?;
            } else {
                output::print_view_prompt(&lookup);
            }
            if let PromptLookup::ImageNotFound { query, .. } = lookup {
                return Err(Error::ImageNotFound(query));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `prompt2image.toml`, apply directory flags, and anchor every path at
/// the project root.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = config::load_config(&cli.root)?;
    if let Some(dir) = &cli.prompts_dir {
        config.paths.prompts_dir = dir.clone();
    }
    if let Some(dir) = &cli.outputs_dir {
        config.paths.outputs_dir = dir.clone();
    }
    if let Some(file) = &cli.gallery {
        config.paths.gallery = file.clone();
    }
    config.resolve_paths(&cli.root);
    tracing::debug!(?config.paths, "resolved paths");
    Ok(config)
}

/// Read the credential once and hand it to the client. Runs before the prompt
/// is read, so a missing key fails without touching the filesystem or network.
fn build_client(config: &Config) -> Result<GeminiClient> {
    let var = &config.generation.api_key_env;
    let api_key = std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::MissingCredential(var.clone()))?;

    Ok(GeminiClient::builder()
        .api_key(api_key)
        .generation_config(&config.generation)
        .build()?)
}

/// Drive one future to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    Ok(runtime.block_on(future))
}

/// Logs go to stderr so stdout stays clean for results and `--json`.
///
/// Without `-v`, `RUST_LOG` is honoured and defaults to `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,prompt2image=info"),
        _ => EnvFilter::new("info,prompt2image=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
