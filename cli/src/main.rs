use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use truthbot_core::ChatSession;
use truthbot_core::config::Config;
use truthbot_core::config::ConfigOverrides;
use truthbot_judge_client::ComparisonBackend;
use truthbot_judge_client::MockClient;
use truthbot_judge_client::SessionId;

mod render;

use crate::render::render_history;
use crate::render::render_turn;

/// Ask two models the same question and let a judge pick the better answer.
#[derive(Debug, Parser)]
#[command(name = "truthbot", version)]
struct Cli {
    /// Root URL of the comparison service.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Read settings from this file instead of `$TRUTHBOT_HOME/config.toml`.
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_path: Option<PathBuf>,

    /// Answer locally with a canned backend instead of calling the service.
    #[arg(long, global = true)]
    mock: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive conversation; one query per line (default).
    Chat,

    /// Run a single turn and print the result.
    Ask(AskArgs),

    /// Show the turns the service stored for a session.
    History(HistoryArgs),

    /// Check that the service is reachable.
    Health,
}

#[derive(Debug, clap::Args)]
struct AskArgs {
    query: String,

    /// Print the turn record as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, clap::Args)]
struct HistoryArgs {
    session_id: String,

    /// Print the entries as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Honor `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let color =
        !cli.no_color && supports_color::on_cached(supports_color::Stream::Stdout).is_some();
    let backend = build_backend(&cli)?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(ChatSession::new(backend), color).await,
        Command::Ask(args) => {
            let session = ChatSession::new(backend);
            let record = session.submit_query(&args.query).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", render_turn(&record, color));
            }
            Ok(())
        }
        Command::History(args) => {
            let entries = backend
                .history(&SessionId(args.session_id))
                .await
                .context("failed to fetch history")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", render_history(&entries, color));
            }
            Ok(())
        }
        Command::Health => {
            let status = backend.health().await.context("health check failed")?;
            println!("{status}");
            Ok(())
        }
    }
}

fn build_backend(cli: &Cli) -> anyhow::Result<Arc<dyn ComparisonBackend>> {
    if cli.mock {
        info!("using the offline mock backend");
        return Ok(Arc::new(MockClient::new()));
    }
    let config = Config::load(ConfigOverrides {
        base_url: cli.base_url.clone(),
        config_path: cli.config_path.clone(),
    })
    .context("failed to load configuration")?;
    info!("using comparison service at {}", config.base_url);
    let client = config
        .http_client()
        .context("failed to build comparison client")?;
    Ok(Arc::new(client))
}

async fn run_chat(session: ChatSession, color: bool) -> anyhow::Result<()> {
    eprintln!("Type a question and press enter. /history lists stored turns, /quit exits.");
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print_prompt()?;
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            res = lines.next_line() => res.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                match session.remote_history().await {
                    Ok(entries) => println!("{}", render_history(&entries, color)),
                    Err(err) => eprintln!("error: {err}"),
                }
                continue;
            }
            _ => {}
        }

        eprintln!("Consulting both participants and the judge...");
        match session.submit_query(&line).await {
            Ok(record) => println!("{}\n", render_turn(&record, color)),
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}

fn print_prompt() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
