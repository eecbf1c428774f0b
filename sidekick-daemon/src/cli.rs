//! CLI argument definitions for sidekick-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Falco event fan-out daemon.
///
/// Reads Falco JSON events, one per line, from standard input and
/// delivers each of them to every enabled output.
#[derive(Parser, Debug)]
#[command(name = "sidekick-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to sidekick.toml configuration file.
    ///
    /// When omitted, defaults and `SIDEKICK_*` environment variables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without reading events.
    #[arg(long)]
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = DaemonCli::try_parse_from([
            "sidekick-daemon",
            "--config",
            "/etc/sidekick/sidekick.toml",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--validate",
        ])
        .unwrap();

        assert_eq!(
            cli.config,
            Some(PathBuf::from("/etc/sidekick/sidekick.toml"))
        );
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("pretty"));
        assert!(cli.validate);
    }

    #[test]
    fn config_is_optional() {
        let cli = DaemonCli::try_parse_from(["sidekick-daemon"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.validate);
    }
}
