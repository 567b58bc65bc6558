//! persona-card CLI entry point.
//!
//! Provides `generate` (fetch, summarise and render a Reddit user's persona)
//! and `render` (draw an existing persona text file as an image).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use persona_card::config::{load_config, load_default_config, Config};
use persona_card::credentials::load_default_credentials;
use persona_card::logging;
use persona_card::pipeline::PersonaPipeline;
use persona_card::providers::provider_from_spec;
use persona_card::reddit::RedditClient;
use persona_card::render::try_render;

/// Reddit user persona generator.
#[derive(Parser)]
#[command(name = "persona-card", version, about)]
struct Cli {
    /// Configuration file (default: ~/.persona-card/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate a persona for a Reddit user and render it.
    Generate {
        /// Reddit username or profile URL.
        user: String,
        /// Language model API key (default: the key named in config, GROQ_API_KEY).
        #[arg(long)]
        api_key: Option<String>,
        /// Model spec as `<provider>/<model>`.
        #[arg(long)]
        model: Option<String>,
        /// Output directory for the text and image files.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Render a persona text file to an image.
    Render {
        /// Persona text file, or `-` for stdin.
        input: PathBuf,
        /// Output image path.
        #[arg(long, short, default_value = "persona_output.png")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _logging_guard = match &cli.log_dir {
        Some(dir) => Some(logging::init_with_file(dir)?),
        None => {
            logging::init_cli();
            None
        }
    };

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config().context("failed to load configuration")?,
    };

    match cli.command {
        Command::Generate {
            user,
            api_key,
            model,
            out_dir,
        } => handle_generate(&config, &user, api_key, model, out_dir).await,
        Command::Render { input, output } => handle_render(&config, &input, &output),
    }
}

async fn handle_generate(
    config: &Config,
    user: &str,
    api_key: Option<String>,
    model: Option<String>,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let credentials = load_default_credentials([
        config.models.api_key_env.as_str(),
        config.reddit.client_id_env.as_str(),
        config.reddit.client_secret_env.as_str(),
    ])?;

    let api_key = match api_key {
        Some(key) => key,
        None => credentials.require(&config.models.api_key_env)?,
    };
    let model = model.unwrap_or_else(|| config.models.default.clone());
    let provider = provider_from_spec(&model, &api_key)?;
    let reddit = RedditClient::from_credentials(&credentials, &config.reddit)?;
    let out_dir = out_dir.unwrap_or_else(|| config.output.dir.clone());

    let pipeline = PersonaPipeline::new(
        &reddit,
        &provider,
        config.models.max_tokens,
        config.render.clone(),
    );

    let mut stdout = std::io::stdout();
    let outcome = pipeline
        .run(user, &out_dir, |delta| {
            let _ = stdout.write_all(delta.as_bytes());
            let _ = stdout.flush();
        })
        .await?;
    println!();

    info!(username = %outcome.username, "persona generated");
    println!("Persona text:  {}", outcome.text_path.display());
    match &outcome.image_path {
        Some(path) => println!("Persona image: {}", path.display()),
        None => eprintln!("Persona image could not be rendered; see log for details."),
    }
    Ok(())
}

fn handle_render(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let text = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read persona text from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let outcome = try_render(&text, output, &config.render)?;
    println!(
        "Wrote {} ({}x{}, {} sections, {} fonts)",
        output.display(),
        outcome.width,
        outcome.height,
        outcome.sections,
        outcome.fonts
    );
    Ok(())
}
