use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use axum::http::{HeaderValue, Method};
use clap::{Parser, ValueEnum};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::ServerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Collaborative whiteboard relay server")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,
    /// Allowed origins; `*` allows any.
    #[arg(
        long = "cors-origin",
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,
    #[arg(long, env = "DRAWBOARD_ENV", value_enum, default_value = "development")]
    pub environment: Environment,
    /// Fallback filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,
    #[arg(long, env = "TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.public_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"))
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn tls(&self) -> Option<(&Path, &Path)> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ServerError> {
        let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
        if self.cors_origins.iter().any(|origin| origin.trim() == "*") {
            return Ok(layer.allow_origin(Any));
        }
        let origins = self
            .cors_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ServerError::InvalidOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(layer.allow_origin(AllowOrigin::list(origins)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_list() {
        let config = Config::try_parse_from([
            "drawboard",
            "--port",
            "8080",
            "--cors-origin",
            "http://a.test,http://b.test",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.cors_layer().is_ok());
    }

    #[test]
    fn rejects_unusable_origin() {
        let config =
            Config::try_parse_from(["drawboard", "--cors-origin", "http://bad\u{1}origin"]).unwrap();
        assert!(matches!(
            config.cors_layer(),
            Err(ServerError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn tls_needs_both_files() {
        assert!(Config::try_parse_from(["drawboard", "--tls-cert", "cert.pem"]).is_err());
        let config = Config::try_parse_from([
            "drawboard",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .unwrap();
        assert!(config.tls().is_some());
    }

    #[test]
    fn production_mode_is_selectable() {
        let config =
            Config::try_parse_from(["drawboard", "--environment", "production"]).unwrap();
        assert!(!config.is_development());
    }
}
