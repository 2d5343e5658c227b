//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ClientOptions, VENDOR_PARAM, VERSION_PARAM};
use crate::error::{Error, Result};
use crate::pagination::DeltaClient;
use crate::request::build_first_url;
use crate::types::{Item, JsonValue};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Url => self.url(),
            Commands::Page { next_url } => self.page(next_url.clone()).await,
            Commands::Tail { limit } => self.tail(*limit).await,
        }
    }

    /// Merge inline JSON options with command-line flags
    pub fn options(&self) -> Result<ClientOptions> {
        let mut options = match &self.cli.options_json {
            Some(json) => ClientOptions::from_json(&serde_json::from_str(json)?)?,
            None => ClientOptions::default(),
        };

        if let Some(api) = &self.cli.api {
            options.api = Some(api.clone());
        }
        if let Some(vendor) = &self.cli.vendor {
            options
                .parameters
                .insert(VENDOR_PARAM.to_string(), JsonValue::String(vendor.clone()));
        }
        if let Some(version) = &self.cli.api_version {
            options
                .parameters
                .insert(VERSION_PARAM.to_string(), JsonValue::String(version.clone()));
        }
        for (key, value) in &self.cli.params {
            options
                .parameters
                .insert(key.clone(), JsonValue::String(value.clone()));
        }
        if let Some(base_url) = &self.cli.base_url {
            options.base_url = Some(base_url.clone());
        }
        if self.cli.retries.is_some() {
            options.retries = self.cli.retries;
        }
        if self.cli.retry_sleep.is_some() {
            options.retry_sleep = self.cli.retry_sleep;
        }
        options.debug |= self.cli.verbose;

        Ok(options)
    }

    fn client(&self) -> Result<DeltaClient> {
        let client = DeltaClient::from_options(self.options()?)?;

        let token = client.cancellation_token().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling fetch");
                token.cancel();
            }
        });

        Ok(client)
    }

    fn url(&self) -> Result<()> {
        let config = self.options()?.into_config()?;
        println!("{}", build_first_url(&config));
        Ok(())
    }

    async fn page(&self, next_url: Option<String>) -> Result<()> {
        let mut client = self.client()?;
        if next_url.is_some() {
            client.set_next_url(next_url);
        }

        let body = client.next_feed().await?;
        println!("{}", String::from_utf8_lossy(&body));
        Ok(())
    }

    async fn tail(&self, limit: usize) -> Result<()> {
        let mut client = self.client()?;
        let mut printed = 0usize;

        while limit == 0 || printed < limit {
            match client.next_item().await {
                Ok(item) => {
                    println!("{}", self.render(&item)?);
                    printed += 1;
                }
                Err(Error::StreamExhausted { last_url }) => {
                    info!("Stream ended after {last_url}");
                    break;
                }
                Err(Error::Cancelled { .. }) => {
                    warn!("Cancelled after {printed} items");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let stats = client.stats();
        info!(
            "Printed {printed} items from {} pages ({} empty)",
            stats.pages_fetched, stats.empty_pages
        );
        Ok(())
    }

    fn render(&self, item: &Item) -> Result<String> {
        Ok(match self.cli.format {
            OutputFormat::Json => serde_json::to_string(item)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(item)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_flags_become_options() {
        let runner = runner(&[
            "deltafeed",
            "--api",
            "permalink.getDelta",
            "--vendor",
            "acme",
            "-p",
            "limit=10",
            "--api-version",
            "3.0.0",
            "--retries",
            "2",
            "--retry-sleep",
            "1",
            "tail",
            "-n",
            "5",
        ]);
        assert_eq!(runner.cli.command, Commands::Tail { limit: 5 });

        let config = runner.options().unwrap().into_config().unwrap();
        assert_eq!(config.method, "permalink.getDelta");
        assert_eq!(config.vendor(), Some("acme"));
        assert_eq!(config.version, "3.0.0");
        assert_eq!(config.params.get("limit"), Some(&"10".to_string()));
        assert_eq!(config.fetch.retries, 2);
        assert_eq!(config.fetch.retry_sleep, Duration::from_secs(1));
    }

    #[test]
    fn test_flags_override_inline_json() {
        let runner = runner(&[
            "deltafeed",
            "--options-json",
            r#"{"api": "feed.getDelta", "parameters": {"vendor": "json"}, "retries": 9}"#,
            "--vendor",
            "flag",
            "url",
        ]);

        let config = runner.options().unwrap().into_config().unwrap();
        assert_eq!(config.method, "feed.getDelta");
        assert_eq!(config.vendor(), Some("flag"));
        assert_eq!(config.fetch.retries, 9);
    }

    #[test]
    fn test_missing_vendor_is_config_error() {
        let runner = runner(&["deltafeed", "--api", "permalink.getDelta", "url"]);
        let err = runner.options().unwrap().into_config().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_bad_param_rejected_by_parser() {
        let result = Cli::try_parse_from(["deltafeed", "-p", "novalue", "url"]);
        assert!(result.is_err());
    }
}
