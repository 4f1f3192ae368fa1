//! Playground server - evaluation and example catalog endpoints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use playground_server::evaluator::{CommandEvaluator, EvaluatorConfig};
use playground_server::examples::load_examples;
use playground_server::state::AppState;

#[derive(Parser)]
#[command(name = "playground-server")]
#[command(about = "Serves the playground evaluator and example catalog")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Directory with one example snippet per file
    #[arg(long, default_value = "public/examples")]
    examples_dir: PathBuf,

    /// Directory containing UI static files
    #[arg(long)]
    ui_dir: Option<PathBuf>,

    /// Wall-clock limit for a single evaluation
    #[arg(long, default_value = "10")]
    eval_timeout_secs: u64,

    /// Bytes of evaluator output kept per stream
    #[arg(long, default_value = "1000000")]
    output_limit_bytes: usize,

    /// Evaluator command; receives the snippet on stdin
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    evaluator: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("playground_server=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let evaluator = CommandEvaluator::new(EvaluatorConfig {
        command: args.evaluator,
        timeout: Duration::from_secs(args.eval_timeout_secs),
        output_limit_bytes: args.output_limit_bytes,
    })?;
    info!(command = ?evaluator.config().command, "evaluator configured");

    let examples = load_examples(&args.examples_dir).context("load examples")?;
    info!(dir = %args.examples_dir.display(), count = examples.len(), "examples loaded");

    let state = AppState::new(evaluator, &examples)?;
    let app = playground_server::app(state, args.ui_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trailing_evaluator_command() {
        let args = Args::parse_from([
            "playground-server",
            "--port",
            "9000",
            "gluon",
            "--stdin",
            "-e",
        ]);
        assert_eq!(args.port, 9000);
        assert_eq!(args.evaluator, vec!["gluon", "--stdin", "-e"]);
    }

    #[test]
    fn evaluator_command_is_required() {
        assert!(Args::try_parse_from(["playground-server"]).is_err());
    }
}
