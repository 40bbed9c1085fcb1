//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::storage::DEFAULT_CONFIG_PATH;

/// Campus electricity quota watcher.
///
/// Fetches the remaining quota once, pushes it to Telegram, and mails a
/// warning when the quota is low or exceeded. Schedule it with cron.
#[derive(Parser, Debug)]
#[command(name = "ampwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, env = "AMPWATCH_CONFIG")]
    pub config: PathBuf,

    /// Run the one-time Gmail authorization and write the token file, then exit
    #[arg(long)]
    pub authorize_email: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_defaults_to_config_dir() {
        let cli = Cli::try_parse_from(["ampwatch"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config/config.json"));
        assert!(!cli.authorize_email);
    }

    #[test]
    fn short_config_flag() {
        let cli = Cli::try_parse_from(["ampwatch", "-c", "/etc/ampwatch.json", "-v"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/ampwatch.json"));
        assert!(cli.verbose);
    }

    #[test]
    fn subcommands_are_rejected() {
        assert!(Cli::try_parse_from(["ampwatch", "usage"]).is_err());
    }
}
