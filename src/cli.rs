//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// randmean - dispersion statistics over true random numbers
///
/// Serves `GET /mean/?requests=N&length=L`: fetches N sequences of L
/// integers from random.org and reports the standard deviation of each
/// sequence and of their sums.
///
/// Examples:
///   randmean
///   randmean --port 8080 --max-in-flight 2
///   RANDOM_ORG_API_KEY=... randmean --config ./randmean.toml
///   randmean --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Address to bind (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind (overrides config file)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .randmean.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// random.org JSON-RPC endpoint
    #[arg(long, value_name = "URL")]
    pub upstream_url: Option<String>,

    /// random.org API key
    #[arg(long, env = "RANDOM_ORG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum upstream calls in flight at once
    ///
    /// random.org asks clients not to send simultaneous requests; the
    /// default of 1 serializes them.
    #[arg(long, value_name = "NUM")]
    pub max_in_flight: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .randmean.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.upstream_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Upstream URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max_in_flight) = self.max_in_flight {
            if max_in_flight == 0 {
                return Err("Max in flight must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn make_args() -> Args {
        Args {
            host: None,
            port: None,
            config: None,
            upstream_url: None,
            api_key: None,
            timeout: None,
            max_in_flight: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "randmean",
            "--port",
            "8080",
            "--max-in-flight",
            "3",
            "--upstream-url",
            "http://localhost:9000/invoke",
        ])
        .unwrap();
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.max_in_flight, Some(3));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.upstream_url = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.max_in_flight = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.port = Some(9999);
        args.timeout = Some(5);
        args.api_key = Some("secret".to_string());

        config.merge_with_args(&args);
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.upstream.timeout_seconds, 5);
        assert_eq!(config.upstream.api_key.as_deref(), Some("secret"));
        assert_eq!(config.upstream.max_in_flight, 1);
    }

    #[test]
    fn test_merge_ignores_blank_key() {
        let mut config = Config::default();
        config.upstream.api_key = Some("from-file".to_string());
        let mut args = make_args();
        args.api_key = Some("  ".to_string());

        config.merge_with_args(&args);
        assert_eq!(config.upstream.api_key.as_deref(), Some("from-file"));
    }
}
