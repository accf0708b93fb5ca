use chat_completion_client::{Client, ClientConfig, ClientError};
use clap::Parser;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str = "Hello. What can you do?";

/// Send one prompt to a chat completion endpoint and print the reply.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prompt to send
    #[arg(default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Bearer token (can also be set via API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Full chat completions endpoint URL (can also be set via API_URL)
    #[arg(short = 'u', long)]
    api_url: Option<String>,

    /// Model identifier (can also be set via MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature in [0.0, 2.0] (can also be set via TEMPERATURE)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Optional system message (can also be set via SYSTEM_PROMPT)
    #[arg(short, long)]
    system: Option<String>,

    /// Request timeout in seconds (can also be set via REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,
}

impl Args {
    /// Flag value for a config variable, if one was given on the command line.
    fn flag(&self, name: &str) -> Option<String> {
        match name {
            "API_KEY" => self.api_key.clone(),
            "API_URL" => self.api_url.clone(),
            "MODEL" => self.model.clone(),
            "TEMPERATURE" => self.temperature.map(|t| t.to_string()),
            "SYSTEM_PROMPT" => self.system.clone(),
            "REQUEST_TIMEOUT_SECS" => self.timeout.map(|t| t.to_string()),
            _ => None,
        }
    }

    fn config(&self) -> Result<ClientConfig, ClientError> {
        self.config_with(|name| env::var(name).ok())
    }

    /// Non-empty flags win; anything else falls back to `env`.
    fn config_with<E>(&self, env: E) -> Result<ClientConfig, ClientError>
    where
        E: Fn(&str) -> Option<String>,
    {
        ClientConfig::from_lookup(|name| {
            self.flag(name)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(name))
        })
    }
}

/// Lines printed to stderr for a failed call.
fn render_error(err: &ClientError) -> Vec<String> {
    match err {
        ClientError::ApiError { status, body } => {
            let mut lines = vec![format!("Error: {}", status), body.clone()];
            if let Some(summary) = err.api_error_summary() {
                lines.push(format!("Error: {}", summary));
            }
            lines
        }
        other => vec![format!("Error: {}", other)],
    }
}

async fn run(args: &Args) -> Result<String, ClientError> {
    let config = args.config()?;
    tracing::debug!(?config, "resolved configuration");
    let client = Client::from_config(config)?;
    client.complete(&args.prompt).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(content) => {
            println!("{}", content);
            ExitCode::SUCCESS
        }
        Err(err) => {
            for line in render_error(&err) {
                eprintln!("{}", line);
            }
            ExitCode::FAILURE
        }
    }
}
