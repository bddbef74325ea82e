//! `specview serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use specview_config::{CliSettings, Config};
use specview_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover specview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder of markdown documents to serve and watch (overrides config).
    #[arg(short, long, env = "SPECVIEW_FOLDER")]
    folder: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (connection and reload logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config_path = self.config.clone();
        let config = Config::load(config_path.as_deref(), Some(&self.into_settings()))?;

        output.info("");
        output.success("specview is running");
        output.field(
            "Local:",
            &format!("http://{}:{}/", config.server.host, config.server.port),
        );
        output.field(
            "Folder:",
            &config.docs_resolved.source_dir.display().to_string(),
        );
        output.field(
            "Reload:",
            if config.live_reload.enabled {
                "enabled"
            } else {
                "disabled"
            },
        );
        if let Some(path) = &config.config_path {
            output.field("Config:", &path.display().to_string());
        }
        output.info("");
        output.hint("Press Ctrl+C to stop");

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config).await?;

        output.success("Server stopped");
        Ok(())
    }

    /// Command line overrides for the loaded config.
    fn into_settings(self) -> CliSettings {
        let live_reload_enabled = self.no_live_reload.then_some(false).or(self.live_reload);
        CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.folder,
            live_reload_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn settings(args: &[&str]) -> CliSettings {
        let argv = std::iter::once("serve").chain(args.iter().copied());
        TestCli::try_parse_from(argv).unwrap().serve.into_settings()
    }

    #[test]
    fn test_no_flags_override_nothing() {
        let settings = settings(&[]);

        assert_eq!(settings.host, None);
        assert_eq!(settings.port, None);
        assert_eq!(settings.source_dir, None);
        assert_eq!(settings.live_reload_enabled, None);
    }

    #[test]
    fn test_flags_map_to_settings() {
        let settings = settings(&["-f", "docs/specs", "--host", "0.0.0.0", "-p", "8080"]);

        assert_eq!(settings.source_dir, Some(PathBuf::from("docs/specs")));
        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.port, Some(8080));
    }

    #[test]
    fn test_no_live_reload_disables() {
        assert_eq!(settings(&["--no-live-reload"]).live_reload_enabled, Some(false));
        assert_eq!(
            settings(&["--live-reload", "true"]).live_reload_enabled,
            Some(true)
        );
    }

    #[test]
    fn test_live_reload_flags_conflict() {
        let result =
            TestCli::try_parse_from(["serve", "--live-reload", "true", "--no-live-reload"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(TestCli::try_parse_from(["serve", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let cli = TestCli::try_parse_from(["serve", "-v"]).unwrap();
        assert!(cli.serve.verbose);
    }
}
