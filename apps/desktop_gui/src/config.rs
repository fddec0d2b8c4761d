//! Deployment-time configuration for the desktop client.
//!
//! The processing service base address is the only configurable value:
//! `--server-url` flag, then the `PHASE_API_URL` environment variable, then
//! the local development fallback.

use anyhow::Context;
use clap::Parser;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const SERVER_URL_ENV: &str = "PHASE_API_URL";

#[derive(Debug, Parser)]
#[command(
    name = "phase-simulator",
    about = "Desktop client for the phase simulation processing service"
)]
pub struct Cli {
    /// Base address of the processing service.
    #[arg(long)]
    pub server_url: Option<String>,
}

impl Cli {
    pub fn resolve_server_url(&self) -> anyhow::Result<String> {
        let candidate = self
            .server_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| std::env::var(SERVER_URL_ENV).ok().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let candidate = candidate.trim().trim_end_matches('/').to_string();
        url::Url::parse(&candidate)
            .with_context(|| format!("'{candidate}' is not a valid server URL"))?;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins_and_is_normalized() {
        let cli = Cli {
            server_url: Some("http://imaging.internal:9000/".to_string()),
        };
        assert_eq!(
            cli.resolve_server_url().expect("resolve"),
            "http://imaging.internal:9000"
        );
    }

    #[test]
    fn invalid_url_is_rejected() {
        let cli = Cli {
            server_url: Some("not a url".to_string()),
        };
        assert!(cli.resolve_server_url().is_err());
    }
}
