use std::{env::var, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use stock::provider::DEFAULT_PROXY_URL;

const DEV_PORT: u16 = 21092;
const PROD_PORT: u16 = 21093;
const DEFAULT_GRACE_SECS: u64 = 5;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub kis_proxy_url: String,
    pub version: String,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub addr: SocketAddr,
    pub secret: String,
    /// Development mode: plain HTTP and signature failures are tolerated.
    pub dev: bool,
    /// Certificate and key PEM paths. `None` in development mode.
    pub tls: Option<TlsPaths>,
    pub grace: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    /// Load from the environment. Positional args 1 and 2 are the TLS
    /// certificate and key in production mode.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let grace_secs = match var("WEBHOOK_GRACE_SECS") {
            Ok(v) => v.parse().context("WEBHOOK_GRACE_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_GRACE_SECS,
        };

        Ok(Self {
            discord_token: var("DISCORD_TOKEN").context("DISCORD_TOKEN not set")?,
            kis_proxy_url: var("KIS_PROXY_URL").unwrap_or_else(|_| DEFAULT_PROXY_URL.to_string()),
            version: var("APP_VERSION").unwrap_or_else(|_| "Unknown".to_string()),
            webhook: WebhookConfig::new(
                var("BOT_SERVER_DEV").is_ok_and(|v| v == "1"),
                var("GITHUB_WEBHOOK_SECRET").unwrap_or_default(),
                &args,
                Duration::from_secs(grace_secs),
            )?,
        })
    }
}

impl WebhookConfig {
    pub fn new(dev: bool, secret: String, args: &[String], grace: Duration) -> Result<Self> {
        if dev {
            return Ok(Self {
                addr: SocketAddr::from(([0, 0, 0, 0], DEV_PORT)),
                secret,
                dev,
                tls: None,
                grace,
            });
        }

        if secret.is_empty() {
            bail!("GITHUB_WEBHOOK_SECRET must be set outside development mode");
        }

        let [cert, key, ..] = args else {
            bail!("usage: bot <cert.pem> <key.pem> (TLS paths are required outside development mode)");
        };

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], PROD_PORT)),
            secret,
            dev,
            tls: Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            grace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dev_mode_is_plain_http() {
        let config = WebhookConfig::new(true, String::new(), &[], Duration::from_secs(1)).unwrap();
        assert!(config.dev);
        assert!(config.tls.is_none());
        assert_eq!(config.addr.port(), DEV_PORT);
    }

    #[test]
    fn production_requires_tls_paths() {
        let err = WebhookConfig::new(false, "s3cret".into(), &args(&["cert.pem"]), Duration::ZERO);
        assert!(err.is_err());

        let config = WebhookConfig::new(
            false,
            "s3cret".into(),
            &args(&["cert.pem", "key.pem"]),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(config.addr.port(), PROD_PORT);
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "cert.pem".into(),
                key: "key.pem".into(),
            })
        );
    }

    #[test]
    fn production_requires_secret() {
        let result = WebhookConfig::new(false, String::new(), &args(&["c", "k"]), Duration::ZERO);
        assert!(result.is_err());
    }
}
