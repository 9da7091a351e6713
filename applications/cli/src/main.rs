/// Cassette - terminal playlist player
use cassette_cli::{ClockEngine, CliConfig, Command, Outcome, PollTimer, Session};
use cassette_playback::PlayMode;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cassette")]
#[command(about = "Cassette playlist player", long_about = None)]
struct Cli {
    /// Audio files to queue
    files: Vec<PathBuf>,

    /// Configuration file path (default: ./cassette.toml if present)
    #[arg(short, long, env = "CASSETTE_CONFIG")]
    config: Option<PathBuf>,

    /// Single-track mode: each pick replaces the track, end of track stops
    #[arg(long)]
    single: bool,

    /// Reconcile interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cassette=info,cassette_cli=info,cassette_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.single {
        config.player.mode = PlayMode::Single;
    }
    if let Some(poll_ms) = cli.poll_ms {
        config.player.poll_ms = poll_ms;
    }
    config.validate()?;

    let mut session = Session::new(config.player_config()?, Box::new(ClockEngine::new()));
    if !cli.files.is_empty() {
        let added = session.add_paths(&cli.files)?;
        tracing::info!("Queued {} of {} file(s)", added, cli.files.len());
    }

    run(&mut session).await?;

    tracing::info!("Stopping Cassette");
    Ok(())
}

async fn run(session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut timer = PollTimer::new();

    print_lines(session.drain_events());
    println!("{}", session.status_text());

    loop {
        let player = session.player();
        timer.sync(player.should_poll(), player.poll_interval());

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = Command::parse(&line).and_then(|command| session.execute(command));
                match outcome {
                    Ok(Outcome::Quit) => break,
                    Ok(Outcome::Continue(Some(text))) => println!("{}", text),
                    Ok(Outcome::Continue(None)) => {}
                    Err(e) => {
                        tracing::debug!("Command failed: {}", e);
                        eprintln!("{}", e);
                    }
                }
                print_lines(session.drain_events());
            }
            _ = timer.tick() => {
                session.tick();
                print_lines(session.drain_events());
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
