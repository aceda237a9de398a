use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("c4c")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch and control Coins For College token mining sessions")
        .long_about("c4c shows a student's college token mining sessions: progress of each 24-hour session, tokens earned so far and wallet balances. It can start and stop mining and keep a live view open that merges periodic refreshes with pushed status updates.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .help("Bearer token (overrides C4C_TOKEN and config)")
                .global(true),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .help("Role of the logged-in user (overrides config, default: student)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("status")
                .about("Fetch the dashboard once and print every college")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("watch")
                .about("Keep a live view open until Ctrl-C")
                .arg(
                    Arg::new("no-push")
                        .long("no-push")
                        .help("Poll only, without the live status channel")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .short('i')
                        .help("Poll interval in seconds (overrides config)")
                        .value_parser(value_parser!(u64).range(1..))
                )
        )
        .subcommand(
            Command::new("start")
                .about("Start a mining session for a college")
                .arg(
                    Arg::new("college")
                        .help("College id")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("stop")
                .about("Stop the mining session for a college")
                .arg(
                    Arg::new("college")
                        .help("College id")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("project")
                .about("Project progress and wallet total for a session snapshot, offline")
                .arg(
                    Arg::new("remaining")
                        .long("remaining")
                        .help("Hours left in the session")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("rate")
                        .long("rate")
                        .help("Earning rate in tokens per hour")
                        .default_value("0")
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("tokens")
                        .long("tokens")
                        .help("Tokens accrued so far in the session")
                        .default_value("0")
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .help("Confirmed wallet balance")
                        .default_value("0")
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("inactive")
                        .long("inactive")
                        .help("Treat the session as inactive")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "c4c");
    }

    #[test]
    fn test_cli_status_json_flag() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["c4c", "status", "--json"]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let status_matches = matches.subcommand_matches("status").unwrap();
        assert!(status_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_start_requires_college() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["c4c", "start"]).is_err());

        let matches = build_cli()
            .try_get_matches_from(vec!["c4c", "start", "7"])
            .unwrap();
        let start_matches = matches.subcommand_matches("start").unwrap();
        assert_eq!(start_matches.get_one::<String>("college").unwrap(), "7");
    }

    #[test]
    fn test_cli_global_token_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(vec!["c4c", "stop", "7", "--token", "abc", "--role", "student"])
            .unwrap();
        let stop_matches = matches.subcommand_matches("stop").unwrap();
        assert_eq!(stop_matches.get_one::<String>("token").unwrap(), "abc");
        assert_eq!(stop_matches.get_one::<String>("role").unwrap(), "student");
    }

    #[test]
    fn test_cli_project_values() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "c4c",
                "project",
                "--remaining",
                "18",
                "--rate",
                "0.35",
                "--inactive",
            ])
            .unwrap();
        let project_matches = matches.subcommand_matches("project").unwrap();
        assert_eq!(*project_matches.get_one::<f64>("remaining").unwrap(), 18.0);
        assert_eq!(*project_matches.get_one::<f64>("rate").unwrap(), 0.35);
        assert_eq!(*project_matches.get_one::<f64>("tokens").unwrap(), 0.0);
        assert!(project_matches.get_flag("inactive"));
    }

    #[test]
    fn test_cli_project_requires_remaining() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["c4c", "project"]).is_err());
    }

    #[test]
    fn test_cli_watch_rejects_zero_interval() {
        let app = build_cli();
        assert!(
            app.try_get_matches_from(vec!["c4c", "watch", "--interval", "0"])
                .is_err()
        );
    }
}
