//! A text-mode client for a remote blackjack server.
//!
//! The client restores or starts a session, then reads commands from stdin
//! and redraws the table whenever the controller publishes a new view.

use anyhow::{Context, Result};
use pico_args::Arguments;
use remote_blackjack::{
    Controller, ControllerActor, ControllerHandle, Outcome, controller::DispatchError,
};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use rb_client::{
    api_client::HttpApiClient,
    commands::{self, Command, parse_command},
    config::ClientConfig,
    render::render_view,
};

const HELP: &str = "\
Play blackjack against a remote server

USAGE:
  rb_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:5000]
  --identity PATH       Client id file  [default: .blackjack_client_uuid]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  RB_SERVER_URL, RB_IDENTITY_FILE, RB_REQUEST_TIMEOUT_SECS,
  RB_DELAY_<PHASE>_MS, RUST_LOG
";

struct Args {
    server_url: Option<String>,
    identity_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs
            .opt_value_from_str("--server")
            .context("Invalid --server value")?,
        identity_file: pargs
            .opt_value_from_str("--identity")
            .context("Invalid --identity value")?,
    };

    dotenvy::dotenv().ok();
    env_logger::builder().format_target(false).init();

    let config =
        ClientConfig::from_env(args.server_url, args.identity_file).context("Invalid configuration")?;
    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    log::info!("Connecting to {}", config.server_url);
    let api = HttpApiClient::from_config(&config).context("Failed to build HTTP client")?;
    let controller =
        Controller::new(api, config.controller).context("Failed to build controller")?;
    let (actor, handle) = ControllerActor::new(controller);
    let task = tokio::spawn(actor.run());

    let mut views = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    draw(&render_view(&views.borrow_and_update()))?;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = render_view(&views.borrow_and_update());
                draw(&frame)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !handle_line(&handle, &line).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    handle.shutdown();
    task.await.context("Controller task failed")?;
    println!("\nGoodbye.");
    Ok(())
}

/// Handles one input line. Returns `false` when the client should exit.
async fn handle_line(handle: &ControllerHandle, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }

    let phase = handle.view().state.phase;
    let action = match parse_command(line, phase) {
        Ok(Command::Play(action)) => action,
        Ok(Command::Help) => {
            print!("{}", commands::HELP);
            return true;
        }
        Ok(Command::Quit) => return false,
        Err(e) => {
            println!("{e}");
            return true;
        }
    };

    match handle.dispatch(action).await {
        Ok(Outcome::Ignored) => println!("'{action}' is not available during {phase}"),
        Ok(Outcome::Rejected(message)) => println!("Rejected: {message}"),
        Ok(Outcome::Applied(_) | Outcome::Failed(_)) => {}
        Err(DispatchError::Busy) => println!("Please wait..."),
        Err(DispatchError::Closed) => return false,
    }
    true
}

fn draw(frame: &str) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\n{frame}").context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")
}
