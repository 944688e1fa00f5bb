use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/attendance.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got '{0}'")]
    Port(String),
    #[error("BIND_ADDR must be an IP address, got '{0}'")]
    BindAddr(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Port(value))?,
            None => DEFAULT_PORT,
        };
        let ip = match lookup("BIND_ADDR") {
            Some(value) => value
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::BindAddr(value))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            data_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert!(config.addr.ip().is_unspecified());
        assert_eq!(config.data_path, PathBuf::from("data/attendance.json"));
    }

    #[test]
    fn values_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("APP_DATA_PATH", "/tmp/a.json"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_path, PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::Port(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("BIND_ADDR", "localhost")])),
            Err(ConfigError::BindAddr(_))
        ));
    }
}
