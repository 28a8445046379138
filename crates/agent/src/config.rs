//! Command line / environment configuration, resolved once into an immutable [`Settings`].

use std::time::Duration;

use clap::{ArgAction, Parser};
use radar_core::NamespaceFilter;
use radar_deliver::TrustMode;
use tracing::warn;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);
pub const DEFAULT_CONTROLLER_URL: &str = "http://flux-radar-ui:8443/api/data";
pub const DEFAULT_CLUSTER_NAME: &str = "dev-cluster";

#[derive(Parser, Debug, Clone)]
#[command(name = "fluxradar", version, about = "Collect Flux resource status and ship it to a controller")]
pub struct Cli {
    /// Seconds to pause between cycles (invalid values fall back to 120)
    #[arg(long = "interval-seconds", env = "INTERVAL", default_value = "120")]
    pub interval: String,

    /// Endpoint receiving the snapshot POST
    #[arg(long = "controller-url", env = "CONTROLLER_URL", default_value = DEFAULT_CONTROLLER_URL)]
    pub controller_url: String,

    /// Identity stamped on every snapshot
    #[arg(long = "cluster-name", env = "CLUSTER_NAME", default_value = DEFAULT_CLUSTER_NAME)]
    pub cluster_name: String,

    /// Comma separated namespace allow-list (default: all namespaces)
    #[arg(long = "namespaces", env = "NAMESPACES")]
    pub namespaces: Option<String>,

    /// Skip certificate validation for https endpoints
    #[arg(
        long = "insecure-skip-verify",
        env = "INSECURE_SKIP_VERIFY",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    pub insecure_skip_verify: bool,

    /// Also poll built-in workload kinds (Pod, Service, Deployment, StatefulSet, Job)
    #[arg(
        long = "include-native",
        env = "INCLUDE_NATIVE",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    pub include_native: bool,

    /// Run a single cycle and exit
    #[arg(long = "once", action = ArgAction::SetTrue)]
    pub once: bool,
}

/// Only the literal `true` (any case) switches an option on.
fn parse_switch(raw: &str) -> Result<bool, std::convert::Infallible> {
    Ok(raw.trim().eq_ignore_ascii_case("true"))
}

/// Seconds (fractional allowed); anything else yields the default interval.
pub fn parse_interval(raw: &str) -> Option<Duration> {
    let secs = raw.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Immutable runtime configuration shared by every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval: Duration,
    pub controller_url: String,
    pub cluster_name: String,
    pub namespaces: NamespaceFilter,
    pub trust: TrustMode,
    pub include_native: bool,
    pub once: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let interval = parse_interval(&cli.interval).unwrap_or_else(|| {
            warn!(raw = %cli.interval, fallback_secs = DEFAULT_INTERVAL.as_secs(), "unparseable interval; using fallback");
            DEFAULT_INTERVAL
        });
        Self {
            interval,
            controller_url: cli.controller_url.clone(),
            cluster_name: cli.cluster_name.clone(),
            namespaces: NamespaceFilter::parse(cli.namespaces.as_deref()),
            trust: TrustMode::from_skip_verify(cli.insecure_skip_verify),
            include_native: cli.include_native,
            once: cli.once,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["fluxradar"];
        argv.extend_from_slice(args);
        Settings::from_cli(&Cli::try_parse_from(argv).expect("valid args"))
    }

    #[test]
    fn interval_parsing() {
        assert_eq!(parse_interval("30"), Some(Duration::from_secs(30)));
        assert_eq!(parse_interval(" 1.5 "), Some(Duration::from_millis(1500)));
        assert_eq!(parse_interval("0"), Some(Duration::ZERO));
        assert_eq!(parse_interval("2m"), None);
        assert_eq!(parse_interval("-5"), None);
        assert_eq!(parse_interval("NaN"), None);
        assert_eq!(parse_interval("1e300"), None);
    }

    #[test]
    fn flags_override_defaults() {
        let s = settings(&[
            "--interval-seconds", "15",
            "--controller-url", "https://radar.example.com/api/data",
            "--cluster-name", "prod-eu",
            "--namespaces", "flux-system, apps",
            "--insecure-skip-verify",
            "--include-native", "TRUE",
            "--once",
        ]);
        assert_eq!(s.interval, Duration::from_secs(15));
        assert_eq!(s.controller_url, "https://radar.example.com/api/data");
        assert_eq!(s.cluster_name, "prod-eu");
        assert_eq!(s.namespaces, NamespaceFilter::Only(vec!["flux-system".into(), "apps".into()]));
        assert_eq!(s.trust, TrustMode::Insecure);
        assert!(s.include_native);
        assert!(s.once);
    }

    #[test]
    fn bad_interval_falls_back() {
        assert_eq!(settings(&["--interval-seconds", "soon"]).interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn switch_only_accepts_true() {
        assert_eq!(settings(&["--insecure-skip-verify", "yes"]).trust, TrustMode::Strict);
        assert_eq!(settings(&["--insecure-skip-verify", "false"]).trust, TrustMode::Strict);
        assert_eq!(settings(&["--insecure-skip-verify", "true"]).trust, TrustMode::Insecure);
    }

    #[test]
    fn empty_namespace_flag_means_all() {
        assert_eq!(settings(&["--namespaces", ""]).namespaces, NamespaceFilter::All);
    }
}
