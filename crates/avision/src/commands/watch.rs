use std::sync::Arc;

use clap::ArgMatches;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use avision_core::base_url::display_host;
use avision_core::events;
use avision_core::scheduler::{Command, PollDriver, PollPolicy, PollScheduler, Visibility};
use avision_core::{HttpFetcher, HudReconciler, HudSink};

use super::helpers::{build_runtime, load_config_with_warning, resolve_base_url};
use crate::hud::{JsonLinesHud, TerminalHud};

pub(crate) fn handle_watch_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let paused = matches.get_flag("paused");

    let mut config = load_config_with_warning();
    if let Some(ms) = matches.get_one::<u64>("interval-ms") {
        config.poll.base_interval_ms = Some(*ms);
    }
    if let Some(ms) = matches.get_one::<u64>("background-interval-ms") {
        config.poll.background_interval_ms = Some(*ms);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid polling options: {}", e);
        error!(event = "cli.watch_invalid_options", error = %e);
        events::log_coded_error(&e);
        return Err(e.into());
    }

    let base_url = resolve_base_url(matches, &config)?;
    let machine = PollScheduler::new(
        PollPolicy::from_config(&config.poll),
        base_url.clone(),
        config.default_base_url()?,
    );

    info!(
        event = "cli.watch_started",
        base_url = %base_url,
        interval_ms = config.poll.base_interval_ms(),
        paused = paused,
        json_output = json_output
    );

    let runtime = build_runtime()?;
    let source = Arc::new(HttpFetcher::new()?);
    if json_output {
        runtime.block_on(watch(machine, source, JsonLinesHud::new(std::io::stdout()), paused));
    } else {
        println!(
            "Watching {} (p pause/resume, h/v hide/show, r refresh video, o rotate, u <url>, q quit)\n",
            display_host(&base_url)
        );
        runtime.block_on(watch(machine, source, TerminalHud::new(std::io::stdout()), paused));
    }

    info!(event = "cli.watch_completed");
    events::log_app_shutdown();
    Ok(())
}

/// Run the dashboard until `q` is entered.
///
/// Closing stdin stops command input but not polling.
async fn watch<H: HudSink>(
    machine: PollScheduler,
    source: Arc<HttpFetcher>,
    sink: H,
    paused: bool,
) {
    let (tx, rx) = mpsc::channel(32);
    let driver = PollDriver::new(machine, source, HudReconciler::new(sink));

    if !paused && tx.send(Command::Start).await.is_err() {
        return;
    }

    let _keepalive = tx.clone();
    let input = tokio::spawn(read_commands(tx));

    driver.run(rx).await;
    input.abort();
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(event = "cli.watch_stdin_failed", error = %e);
                break;
            }
        };

        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                eprintln!("Unknown command '{}'. Use p, h, v, r, o, u <url> or q.", line.trim());
            }
            continue;
        };

        let quit = command == Command::Shutdown;
        if tx.send(command).await.is_err() || quit {
            break;
        }
    }
}

/// Parse one line of stdin into a driver command.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head {
        "p" => Command::Toggle,
        "h" => Command::SetVisibility(Visibility::Hidden),
        "v" => Command::SetVisibility(Visibility::Visible),
        "r" => Command::RefreshVideo,
        "o" => Command::Rotate,
        "u" => Command::SetBaseUrl(rest.to_string()),
        "q" => Command::Shutdown,
        _ => return None,
    };

    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_letter_commands() {
        assert_eq!(parse_command("p"), Some(Command::Toggle));
        assert_eq!(
            parse_command(" h "),
            Some(Command::SetVisibility(Visibility::Hidden))
        );
        assert_eq!(
            parse_command("v"),
            Some(Command::SetVisibility(Visibility::Visible))
        );
        assert_eq!(parse_command("r"), Some(Command::RefreshVideo));
        assert_eq!(parse_command("o"), Some(Command::Rotate));
        assert_eq!(parse_command("q"), Some(Command::Shutdown));
    }

    #[test]
    fn test_parse_set_base_url() {
        assert_eq!(
            parse_command("u   http://host:9000/ "),
            Some(Command::SetBaseUrl("http://host:9000/".to_string()))
        );
        // Blank URL means "back to the default"; the scheduler resolves it
        assert_eq!(parse_command("u"), Some(Command::SetBaseUrl(String::new())));
    }

    #[test]
    fn test_parse_unknown_or_empty() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("pause"), None);
        assert_eq!(parse_command("x y"), None);
    }
}
