//! Command-line client for the try-it playground.
//!
//! Drives the playground core against a running server: list the example
//! catalog, evaluate a snippet once, or run an interactive line-based session
//! with the periodic redraw written to stdout. `init` writes a starter config.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

use playground::core::update::Msg;
use playground::exit_codes;
use playground::io::client::{Backend, HttpBackend};
use playground::io::config::{PlaygroundConfig, load_config, write_config};
use playground::io::render::{Renderer, TextRenderer};
use playground::logging;
use playground::session::{self, Session, SessionHandle};
use playground::view::{Frame, format_result};

#[derive(Parser)]
#[command(name = "playground", version, about = "Client for the try-it playground")]
struct Cli {
    /// TOML config file (defaults apply when missing).
    #[arg(long, global = true, default_value = "playground.toml")]
    config: PathBuf,

    /// Server root; sets both endpoints to `<server>/eval` and `<server>/examples`.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the effective configuration (defaults plus `--server`) to `--config`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the names of the example catalog in server order.
    Examples,
    /// Evaluate FILE (or stdin) once and print the result.
    Eval { file: Option<PathBuf> },
    /// Interactive session: lines edit the text, `:submit`, `:select NAME`,
    /// `:clear`, `:show`, `:quit` control it.
    Session,
}

/// Renderer for one-shot commands that print their own output.
struct Silent;

impl Renderer for Silent {
    fn draw(&mut self, _frame: &Frame) {}
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let cfg = match resolve_config(&cli.config, cli.server.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    };

    let code = match run(cli.command, &cli.config, cfg).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn resolve_config(path: &Path, server: Option<&str>) -> Result<PlaygroundConfig> {
    let mut cfg = load_config(path)?;
    if let Some(server) = server {
        cfg.set_server(server);
    }
    cfg.validate()?;
    Ok(cfg)
}

async fn run(command: Command, config_path: &Path, cfg: PlaygroundConfig) -> Result<i32> {
    match command {
        Command::Init { force } => cmd_init(config_path, &cfg, force),
        Command::Examples => cmd_examples(&HttpBackend::new(&cfg)?).await,
        Command::Eval { file } => {
            let backend = Arc::new(HttpBackend::new(&cfg)?);
            cmd_eval(backend, &cfg, file.as_deref()).await
        }
        Command::Session => cmd_session(Arc::new(HttpBackend::new(&cfg)?), &cfg).await,
    }
}

fn cmd_init(path: &Path, cfg: &PlaygroundConfig, force: bool) -> Result<i32> {
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return Ok(exit_codes::INVALID);
    }
    write_config(path, cfg)?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

async fn cmd_examples(backend: &HttpBackend) -> Result<i32> {
    let entries = backend
        .fetch_examples()
        .await
        .context("fetch example catalog")?;
    for entry in entries {
        println!("{}", entry.name);
    }
    Ok(exit_codes::OK)
}

async fn cmd_eval(
    backend: Arc<HttpBackend>,
    cfg: &PlaygroundConfig,
    file: Option<&Path>,
) -> Result<i32> {
    let text = read_source(file).await?;
    let mut session = Session::new(backend, Silent, cfg);
    session.dispatch(Msg::TextChanged(text));
    session.dispatch(Msg::Submit);
    session.settle_one().await;

    match session.state().editor.result() {
        Some(value) => {
            println!("{}", format_result(value));
            Ok(exit_codes::OK)
        }
        // The failure itself was reported on the diagnostic channel.
        None => Ok(exit_codes::FAILED),
    }
}

async fn cmd_session(backend: Arc<HttpBackend>, cfg: &PlaygroundConfig) -> Result<i32> {
    let mut session = Session::new(backend, TextRenderer::new(std::io::stdout()), cfg);
    tokio::spawn(forward_stdin(session.handle()));
    session.mount();
    session.run().await;
    Ok(exit_codes::OK)
}

/// Feed stdin lines to the session as commands until EOF or `:quit`.
async fn forward_stdin(handle: SessionHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = session::Command::parse(&line);
        let quit = command == session::Command::Quit;
        if !handle.command(command) || quit {
            return;
        }
    }
    handle.command(session::Command::Quit);
}

async fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("read stdin")?;
            Ok(text)
        }
    }
}
