use clap::{Arg, ArgAction, Command};
use clap_complete::Shell;

fn base_url_arg() -> Arg {
    Arg::new("base-url")
        .long("base-url")
        .short('u')
        .help("Detection service base URL (overrides config)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

pub fn build_cli() -> Command {
    Command::new("avision")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live status dashboard for the A.VISION detection service")
        .long_about("avision polls a detection service for snapshots of its inference state and renders them as a terminal HUD. Polling backs off while the service is failing and slows down while the dashboard is hidden.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("watch")
                .about("Poll the service continuously and render the HUD")
                .long_about("Poll the service continuously and render the HUD.\n\nCommands are read from stdin, one per line:\n  p        pause or resume polling\n  h / v    mark the dashboard hidden / visible\n  r        force a video stream refresh\n  o        rotate the video a quarter turn\n  u <url>  switch to another base URL\n  q        quit")
                .arg(base_url_arg())
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .help("Polling interval while visible (overrides config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("background-interval-ms")
                        .long("background-interval-ms")
                        .help("Polling interval while hidden (overrides config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("paused")
                        .long("paused")
                        .help("Start with polling paused")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Emit HUD mutations as JSON lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Fetch and display a single snapshot")
                .arg(base_url_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("health")
                .about("Check whether the service reports itself healthy")
                .arg(base_url_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("video-url")
                .about("Print a cache-busting URL for the video stream")
                .arg(base_url_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(Shell)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "avision");
    }

    #[test]
    fn test_cli_watch_command() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "avision",
                "watch",
                "--base-url",
                "http://host:9000",
                "--interval-ms",
                "500",
                "--paused",
            ])
            .unwrap();

        let watch = matches.subcommand_matches("watch").unwrap();
        assert_eq!(
            watch.get_one::<String>("base-url").unwrap(),
            "http://host:9000"
        );
        assert_eq!(watch.get_one::<u64>("interval-ms"), Some(&500));
        assert!(watch.get_flag("paused"));
        assert!(!watch.get_flag("json"));
    }

    #[test]
    fn test_cli_rejects_non_numeric_interval() {
        let app = build_cli();
        let result = app.try_get_matches_from(vec!["avision", "watch", "--interval-ms", "fast"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["avision", "detect", "-v", "--json"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        assert!(matches.subcommand_matches("detect").unwrap().get_flag("json"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["avision"]).is_err());
    }

    #[test]
    fn test_cli_completions_shell() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["avision", "completions", "zsh"])
            .unwrap();
        let sub = matches.subcommand_matches("completions").unwrap();
        assert_eq!(sub.get_one::<Shell>("shell"), Some(&Shell::Zsh));

        let app = build_cli();
        assert!(
            app.try_get_matches_from(vec!["avision", "completions", "tcsh"])
                .is_err()
        );
    }
}
