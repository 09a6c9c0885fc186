//! Configuration and CLI argument handling

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "focus-room")]
#[command(about = "A shared-room Pomodoro timer server with host-controlled synchronization")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Buffered events per room before slow subscribers start skipping
    #[arg(long, default_value = "100")]
    pub channel_capacity: usize,

    /// Maximum chat message length in characters
    #[arg(long, default_value = "500")]
    pub max_chat_chars: usize,

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::try_parse_from(["focus-room"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.channel_capacity, 100);
        assert_eq!(config.max_chat_chars, 500);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn verbose_flag_enables_debug() {
        let config = Config::try_parse_from(["focus-room", "-v", "--port", "8080"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level(), "debug");
    }
}
