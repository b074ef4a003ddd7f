//! Command-line and environment configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use uuid::Uuid;

use crate::backend::TlsPaths;
use crate::multiplexer::MultiplexSettings;

/// Process identifier used when none is configured
pub const DEFAULT_PROCESS: &str = "d31572a0-3799-4391-b3ac-149537a29b38";

#[derive(Parser, Debug, Clone)]
#[command(name = "proxyu-gateway")]
#[command(about = "Browser gateway to a ProxyU data authority")]
pub struct GatewayArgs {
    /// Client private key (PEM)
    #[arg(long, env = "PROXYU_TLS_KEY", default_value = "client.dev.key")]
    pub tls_key: PathBuf,

    /// Client certificate (PEM)
    #[arg(long, env = "PROXYU_TLS_CERT", default_value = "client.dev.pem")]
    pub tls_cert: PathBuf,

    /// CA root certificate (PEM)
    #[arg(long, env = "PROXYU_TLS_CA_CERT", default_value = "ca.pem")]
    pub tls_ca_cert: PathBuf,

    /// Authority address, host:port
    #[arg(long, env = "PROXYU_ADDRESS", default_value = "proxyu:8080")]
    pub proxyu: String,

    /// sqlite database file
    #[arg(long, env = "PROXYU_USERDATA", default_value = "userdata.db")]
    pub userdata: PathBuf,

    /// Process identifier sent with retrieve and permission requests
    #[arg(long, env = "PROXYU_PROCESS", default_value = DEFAULT_PROCESS)]
    pub process: Uuid,

    /// Schema definition (YAML)
    #[arg(long, env = "PROXYU_DAG", default_value = "didgraph.yml")]
    pub dag: PathBuf,

    /// HTTP listen port
    #[arg(long, env = "PROXYU_PORT", default_value_t = 8090)]
    pub port: u16,

    /// Connect to the authority without TLS (local development)
    #[arg(long, env = "PROXYU_INSECURE")]
    pub insecure: bool,

    #[arg(long, default_value_t = 64)]
    pub outbound_capacity: usize,

    #[arg(long, default_value_t = 32)]
    pub delivery_capacity: usize,

    /// How long a slow retrieve waiter may hold up the data stream
    #[arg(long, default_value_t = 5000)]
    pub delivery_timeout_ms: u64,

    /// Event queue size of each browser stream
    #[arg(long, default_value_t = 16)]
    pub event_capacity: usize,

    /// How long the data stream may drain after shutdown starts
    #[arg(long, default_value_t = 500)]
    pub shutdown_grace_ms: u64,
}

impl GatewayArgs {
    pub fn tls(&self) -> Option<TlsPaths> {
        if self.insecure {
            return None;
        }
        Some(TlsPaths {
            cert: self.tls_cert.clone(),
            key: self.tls_key.clone(),
            ca_cert: self.tls_ca_cert.clone(),
        })
    }

    pub fn multiplex_settings(&self) -> MultiplexSettings {
        MultiplexSettings {
            outbound_capacity: self.outbound_capacity,
            delivery_capacity: self.delivery_capacity,
            delivery_timeout: Duration::from_millis(self.delivery_timeout_ms),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = GatewayArgs::try_parse_from(["proxyu-gateway"]).unwrap();
        assert_eq!(args.proxyu, "proxyu:8080");
        assert_eq!(args.port, 8090);
        assert_eq!(args.process.to_string(), DEFAULT_PROCESS);
        assert_eq!(args.shutdown_grace(), Duration::from_millis(500));
        assert_eq!(
            args.multiplex_settings().delivery_timeout,
            Duration::from_secs(5)
        );
        assert_eq!(args.tls().unwrap().ca_cert, PathBuf::from("ca.pem"));
    }

    #[test]
    fn test_insecure_skips_tls() {
        let args =
            GatewayArgs::try_parse_from(["proxyu-gateway", "--insecure", "--port", "9000"])
                .unwrap();
        assert!(args.tls().is_none());
        assert_eq!(args.listen_addr().port(), 9000);
    }
}
