//! Argument parsing, settings validation and the agent entrypoint.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use podnode_core::{DEFAULT_GATEWAY_HOST, GatewayResolver};
use podnode_telemetry::{DEBUG_LOG_LEVEL, DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use reqwest::Url;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::client::{CliError, CliResult, parse_url};
use crate::cycle::{AgentDependencies, CycleOutcome, run_cycle, start_delay, wait_before_work};

const DEFAULT_COORDINATOR_URL: &str = "https://IPFSPodcasting.net";
const DEFAULT_LOG_FILE: &str = "ipfspodcastnode.log";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_START_DELAY_SECS: u64 = 150;

/// Parses arguments, runs one work cycle and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let settings = match AgentSettings::try_from(cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let level = if settings.debug {
        DEBUG_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let logging = LoggingConfig {
        level,
        format: settings.log_format,
        log_file: settings.log_file.as_deref(),
    };
    if let Err(err) = init_logging(&logging) {
        let err = CliError::failure(anyhow!(err).context("failed to initialise logging"));
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    wait_before_work(start_delay(settings.debug, settings.max_start_delay)).await;

    let run_id = Uuid::new_v4();
    let result = execute(&settings)
        .instrument(info_span!("cycle", %run_id))
        .await;

    match result {
        Ok(CycleOutcome::Reported { report, response }) => {
            info!(
                used = ?report.used(),
                avail = ?report.avail(),
                response = %response.trim(),
                "report delivered"
            );
            0
        }
        Ok(CycleOutcome::RequestError | CycleOutcome::NoWork) => 0,
        Err(err) => {
            let message = err.display_message();
            error!(error = %message, "work cycle failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

async fn execute(settings: &AgentSettings) -> CliResult<CycleOutcome> {
    let deps = AgentDependencies::from_settings(settings)?;
    run_cycle(&deps).await
}

#[derive(Parser, Debug)]
#[command(
    name = "podnode",
    about = "Poll the podcast coordinator and apply one unit of work to a local IPFS node"
)]
struct Cli {
    #[arg(long, alias = "rpc_url", env = "PODNODE_RPC_URL", value_parser = parse_url)]
    rpc_url: Url,
    #[arg(long, env = "PODNODE_EMAIL")]
    email: String,
    #[arg(
        long,
        env = "PODNODE_COORDINATOR_URL",
        value_parser = parse_url,
        default_value = DEFAULT_COORDINATOR_URL
    )]
    coordinator_url: Url,
    #[arg(
        long,
        alias = "log_file",
        env = "PODNODE_LOG_FILE",
        default_value = DEFAULT_LOG_FILE,
        help = "Append logs to this file; pass an empty value to log to stderr"
    )]
    log_file: String,
    #[arg(long, env = "PODNODE_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
    #[arg(long, env = "PODNODE_DEBUG")]
    debug: bool,
    #[arg(long, env = "PODNODE_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    #[arg(
        long,
        env = "PODNODE_MAX_START_DELAY_SECS",
        default_value_t = DEFAULT_MAX_START_DELAY_SECS
    )]
    max_start_delay: u64,
    #[arg(long, env = "PODNODE_DISK_ROOT", default_value = "/")]
    disk_root: PathBuf,
    #[arg(
        long = "gateway-host",
        env = "PODNODE_GATEWAY_HOSTS",
        value_delimiter = ',',
        default_value = DEFAULT_GATEWAY_HOST
    )]
    gateway_hosts: Vec<String>,
}

/// Validated agent configuration.
#[derive(Debug, Clone)]
pub(crate) struct AgentSettings {
    pub(crate) rpc_url: Url,
    pub(crate) email: String,
    pub(crate) coordinator_url: Url,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) log_format: LogFormat,
    pub(crate) debug: bool,
    pub(crate) timeout: Duration,
    pub(crate) max_start_delay: u64,
    pub(crate) disk_root: PathBuf,
    pub(crate) gateways: GatewayResolver,
}

impl TryFrom<Cli> for AgentSettings {
    type Error = CliError;

    fn try_from(cli: Cli) -> CliResult<Self> {
        let email = cli.email.trim().to_string();
        if email.is_empty() {
            return Err(CliError::validation("email must not be empty"));
        }
        if !email.contains('@') {
            return Err(CliError::validation(format!(
                "email '{email}' is not a valid address"
            )));
        }
        if cli.timeout == 0 {
            return Err(CliError::validation("timeout must be greater than zero"));
        }

        let log_file = cli.log_file.trim();
        let log_file = (!log_file.is_empty()).then(|| PathBuf::from(log_file));
        let hosts: Vec<String> = cli
            .gateway_hosts
            .iter()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect();
        if hosts.is_empty() {
            return Err(CliError::validation(
                "at least one gateway host must be configured",
            ));
        }

        Ok(Self {
            rpc_url: cli.rpc_url,
            email,
            coordinator_url: cli.coordinator_url,
            log_file,
            log_format: LogFormat::from_name(&cli.log_format),
            debug: cli.debug,
            timeout: Duration::from_secs(cli.timeout),
            max_start_delay: cli.max_start_delay,
            disk_root: cli.disk_root,
            gateways: GatewayResolver::new(hosts),
        })
    }
}

#[cfg(test)]
pub(crate) fn settings_from_args(args: &[&str]) -> CliResult<AgentSettings> {
    let argv = std::iter::once("podnode").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv)
        .map_err(|err| CliError::validation(err.to_string()))?;
    AgentSettings::try_from(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 4] = [
        "--rpc-url",
        "http://127.0.0.1:5001",
        "--email",
        "host@example.com",
    ];

    fn with_required(extra: &[&'static str]) -> Vec<&'static str> {
        REQUIRED.iter().copied().chain(extra.iter().copied()).collect()
    }

    #[test]
    fn defaults_apply_when_only_required_flags_given() {
        let settings = settings_from_args(&REQUIRED).expect("valid settings");

        assert_eq!(settings.rpc_url.as_str(), "http://127.0.0.1:5001/");
        assert_eq!(settings.email, "host@example.com");
        assert_eq!(
            settings.coordinator_url.as_str(),
            "https://ipfspodcasting.net/"
        );
        assert_eq!(
            settings.log_file.as_deref(),
            Some(std::path::Path::new(DEFAULT_LOG_FILE))
        );
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert!(!settings.debug);
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.max_start_delay, 150);
        assert_eq!(settings.disk_root, PathBuf::from("/"));
        assert_eq!(
            settings.gateways.internal_path("https://ipfs.io/ipfs/QmA"),
            Some("QmA".to_string())
        );
    }

    #[test]
    fn underscore_aliases_are_accepted() {
        let settings = settings_from_args(&[
            "--rpc_url",
            "http://node:5001",
            "--email",
            "a@b.c",
            "--log_file",
            "/tmp/agent.log",
        ])
        .expect("aliases parse");

        assert_eq!(settings.rpc_url.host_str(), Some("node"));
        assert_eq!(
            settings.log_file.as_deref(),
            Some(std::path::Path::new("/tmp/agent.log"))
        );
    }

    #[test]
    fn empty_log_file_selects_stderr() {
        let settings =
            settings_from_args(&with_required(&["--log-file", ""])).expect("valid settings");
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn gateway_hosts_replace_default_list() {
        let settings = settings_from_args(&with_required(&[
            "--gateway-host",
            "gw.example.org",
            "--gateway-host",
            "dweb.link",
        ]))
        .expect("valid settings");

        assert!(
            settings
                .gateways
                .internal_path("https://dweb.link/ipfs/QmA")
                .is_some()
        );
        assert!(
            settings
                .gateways
                .internal_path("https://ipfs.io/ipfs/QmA")
                .is_none()
        );
    }

    #[test]
    fn invalid_email_is_a_validation_error() {
        for email in ["", "   ", "not-an-address"] {
            let err = settings_from_args(&["--rpc-url", "http://127.0.0.1:5001", "--email", email])
                .expect_err("invalid email");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = settings_from_args(&with_required(&["--timeout", "0"]))
            .expect_err("zero timeout");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "timeout must be greater than zero");
    }

    #[test]
    fn malformed_rpc_url_is_rejected() {
        let err = settings_from_args(&["--rpc-url", "127.0.0.1:5001", "--email", "a@b.c"])
            .expect_err("missing scheme");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("invalid URL"));
    }

    #[test]
    fn debug_and_json_format_flags() {
        let settings = settings_from_args(&with_required(&[
            "--debug",
            "--log-format",
            "json",
            "--max-start-delay",
            "0",
        ]))
        .expect("valid settings");

        assert!(settings.debug);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.max_start_delay, 0);
    }
}
