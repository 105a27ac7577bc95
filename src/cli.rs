//! # Command Line
//!
//! Flags accepted by the controller binary. Every flag falls back to the
//! environment; anything left unset keeps the `ControllerConfig` default.

use crate::config::ControllerConfig;
use clap::Parser;

/// ACM Sync Controller
#[derive(Debug, Parser)]
#[command(name = "acm-sync-controller")]
#[command(
    about = "Mirror Kubernetes TLS secrets into AWS Certificate Manager",
    long_about = None
)]
pub struct Cli {
    /// AWS region for the ACM client and certificate ARNs
    #[arg(long, env = "ACM_REGION")]
    pub region: Option<String>,

    /// Number of reconciliation workers
    #[arg(long, env = "WORKER_COUNT")]
    pub workers: Option<usize>,

    /// Only watch secrets in this namespace
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,
}

impl Cli {
    /// Overlay the flags onto `config`
    #[must_use]
    pub fn apply(self, mut config: ControllerConfig) -> ControllerConfig {
        if let Some(region) = self.region {
            config.region = region;
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers.max(1);
        }
        if let Some(namespace) = self.namespace.filter(|ns| !ns.is_empty()) {
            config.watch_namespace = Some(namespace);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "acm-sync-controller",
            "--region",
            "eu-west-1",
            "--workers",
            "0",
            "--namespace",
            "web",
        ])
        .expect("flags should parse");

        let config = cli.apply(ControllerConfig::default());
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.worker_count, 1);
        assert_eq!(config.watch_namespace.as_deref(), Some("web"));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli {
            region: None,
            workers: None,
            namespace: None,
        };
        assert_eq!(
            cli.apply(ControllerConfig::default()),
            ControllerConfig::default()
        );
    }
}
