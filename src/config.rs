//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-timer")]
#[command(about = "A state-managed countdown timer served over a local HTTP API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial countdown in seconds
    #[arg(short, long, default_value = "0", allow_negative_numbers = true, value_parser = parse_seconds)]
    pub seconds: f64,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Start counting down as soon as the server is up
    #[arg(long)]
    pub start: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Parse a countdown budget, rejecting NaN and infinities
fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("invalid number of seconds: {}", e))?;
    if !seconds.is_finite() {
        return Err(format!("seconds must be a finite number, got {}", value));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["countdown-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.seconds, 0.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert!(!config.start);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn accepts_negative_seconds() {
        let config = Config::try_parse_from(["countdown-timer", "--seconds", "-5", "-v"]).unwrap();
        assert_eq!(config.seconds, -5.0);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_non_finite_seconds() {
        for value in ["nan", "NaN", "inf", "-inf", "infinity"] {
            assert!(
                Config::try_parse_from(["countdown-timer", "--seconds", value]).is_err(),
                "{} should be rejected",
                value
            );
        }
        let config = Config::try_parse_from(["countdown-timer", "--seconds", "2.5"]).unwrap();
        assert_eq!(config.seconds, 2.5);
    }

    #[test]
    fn rejects_zero_tick_interval() {
        assert!(Config::try_parse_from(["countdown-timer", "--tick-ms", "0"]).is_err());
    }
}
