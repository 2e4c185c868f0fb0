//! CLI binary for warranty-extract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, then either serves HTTP or runs a single extraction.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use warranty_extract::server::{self, placeholder};
use warranty_extract::{extract_file, resolve_extractor, AppState, ExtractionConfig};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the upload form and extraction endpoint on :5000
  warranty-extract serve

  # Extract a local file without running a server
  warranty-extract extract warranty_card.jpg

  # Send a file to a running server
  warranty-extract upload receipt.pdf --url http://127.0.0.1:5000

  # Placeholder AI service for the web client
  warranty-extract placeholder --bind 127.0.0.1:8000 --cors-origin http://localhost:5173

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Override log filter (e.g. warranty_extract=debug)
"#;

/// Extract warranty details from images and PDFs using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "warranty-extract",
    version,
    about = "Extract warranty details from images and PDFs using Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WARRANTY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "WARRANTY_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form and the extraction endpoint.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "WARRANTY_BIND", default_value = "127.0.0.1:5000")]
        bind: String,

        /// Allowed CORS origin ("*" for any).
        #[arg(long, env = "WARRANTY_CORS_ORIGIN")]
        cors_origin: Option<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Run one extraction on a local file and print the result as JSON.
    Extract {
        /// Image or PDF to read.
        file: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Upload a file to a running server and print its response.
    Upload {
        /// Image or PDF to send.
        file: PathBuf,

        /// Base URL of the server.
        #[arg(long, env = "WARRANTY_URL", default_value = "http://127.0.0.1:5000")]
        url: String,
    },

    /// Serve the placeholder AI service (two static JSON endpoints).
    Placeholder {
        /// Address to listen on.
        #[arg(long, env = "WARRANTY_PLACEHOLDER_BIND", default_value = "127.0.0.1:8000")]
        bind: String,

        /// Allowed CORS origin ("*" for any).
        #[arg(long, env = "WARRANTY_CORS_ORIGIN")]
        cors_origin: Option<String>,
    },
}

/// Flags shared by every subcommand that talks to the model.
#[derive(Args, Debug)]
struct ModelArgs {
    /// Directory receiving warranty_<timestamp>.json files.
    #[arg(long, env = "WARRANTY_OUTPUT_DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// LLM provider: gemini, openai, anthropic, ollama, … (non-gemini/openai need --model).
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "WARRANTY_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "WARRANTY_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Path to a text file containing a custom extraction prompt.
    #[arg(long, env = "WARRANTY_PROMPT")]
    prompt: Option<PathBuf>,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "WARRANTY_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    max_upload_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            cors_origin,
            model,
        } => {
            let config = build_config(&model).await?;
            let state = AppState::new(config)
                .await
                .context("Failed to initialise extraction service")?;
            let cors = server::cors_layer(cors_origin.as_deref()).context("Invalid CORS origin")?;
            let app = server::router(Arc::new(state), cors);
            server::serve(&bind, app).await.context("Server failed")?;
        }

        Command::Extract { file, model } => {
            let config = build_config(&model).await?;
            let extractor = resolve_extractor(&config).context("No LLM provider available")?;
            let output = extract_file(&file, extractor.as_ref(), &config)
                .await
                .with_context(|| format!("Extraction failed for {}", file.display()))?;

            let body = serde_json::json!({
                "status": "success",
                "file_saved": output.file_saved.display().to_string(),
                "data": output.data,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&body).context("Failed to serialise output")?
            );
            if !cli.quiet {
                eprintln!(
                    "{} saved → {}",
                    green("✔"),
                    bold(&output.file_saved.display().to_string())
                );
            }
        }

        Command::Upload { file, url } => {
            let (status, body) = upload(&file, &url).await?;
            println!("{body}");
            if !status.is_success() {
                if !cli.quiet {
                    eprintln!("{} server answered {}", red("✘"), status);
                }
                std::process::exit(1);
            }
        }

        Command::Placeholder { bind, cors_origin } => {
            let cors = server::cors_layer(cors_origin.as_deref()).context("Invalid CORS origin")?;
            server::serve(&bind, placeholder::router(cors))
                .await
                .context("Server failed")?;
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(args: &ModelArgs) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .output_dir(&args.output_dir)
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_upload_bytes(args.max_upload_bytes);

    if let Some(ref path) = args.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }

    builder.build().context("Invalid configuration")
}

/// POST `file` to `<url>/extract-warranty-info` as multipart field `file`.
async fn upload(file: &Path, url: &str) -> Result<(reqwest::StatusCode, String)> {
    let filename = file
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let mime = mime_guess::from_path(file).first_or_octet_stream();

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str(mime.as_ref())
        .context("Invalid MIME type")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let endpoint = format!("{}/extract-warranty-info", url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&endpoint)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("Failed to reach {endpoint}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read server response")?;
    Ok((status, body))
}
