use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Port AbletonOSC listens on.
pub const DEFAULT_SEND_PORT: u16 = 11000;
/// Port AbletonOSC sends its replies to.
pub const DEFAULT_RECEIVE_PORT: u16 = 11001;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_UNMATCHED_CAPACITY: usize = 64;

/// Connection settings for an [`AbletonOSC`](crate::AbletonOSC) client.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "host": "192.168.1.20", "timeout_ms": 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address of the machine running Ableton Live.
    pub host: IpAddr,
    pub send_port: u16,
    /// Local address the reply socket binds to.
    pub listen_host: IpAddr,
    /// Local port for replies. `0` picks an ephemeral port.
    pub receive_port: u16,
    /// How long a query waits for its reply.
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
    /// Number of unmatched replies kept for inspection before the oldest is dropped.
    pub unmatched_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            send_port: DEFAULT_SEND_PORT,
            listen_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            receive_port: DEFAULT_RECEIVE_PORT,
            timeout: DEFAULT_TIMEOUT,
            unmatched_capacity: DEFAULT_UNMATCHED_CAPACITY,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Defaults overlaid with the `ABLETON_OSC_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::default().with_env()
    }

    /// Overlays `ABLETON_OSC_HOST`, `ABLETON_OSC_SEND_PORT`,
    /// `ABLETON_OSC_LISTEN_HOST`, `ABLETON_OSC_RECEIVE_PORT` and
    /// `ABLETON_OSC_TIMEOUT_MS` onto `self`.
    pub fn with_env(self) -> Result<Self, Error> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars<F>(mut self, var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("ABLETON_OSC_HOST") {
            self.host = parse_var("ABLETON_OSC_HOST", &host)?;
        }
        if let Some(port) = var("ABLETON_OSC_SEND_PORT") {
            self.send_port = parse_var("ABLETON_OSC_SEND_PORT", &port)?;
        }
        if let Some(host) = var("ABLETON_OSC_LISTEN_HOST") {
            self.listen_host = parse_var("ABLETON_OSC_LISTEN_HOST", &host)?;
        }
        if let Some(port) = var("ABLETON_OSC_RECEIVE_PORT") {
            self.receive_port = parse_var("ABLETON_OSC_RECEIVE_PORT", &port)?;
        }
        if let Some(ms) = var("ABLETON_OSC_TIMEOUT_MS") {
            self.timeout = Duration::from_millis(parse_var("ABLETON_OSC_TIMEOUT_MS", &ms)?);
        }
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where requests are sent.
    pub fn remote_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.send_port)
    }

    /// Where the reply socket binds.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.receive_port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::validation(key, format!("{value:?}: {e}")))
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_ableton_osc() {
        let config = Config::default();
        assert_eq!(config.remote_addr(), "127.0.0.1:11000".parse().unwrap());
        assert_eq!(config.listen_addr(), "127.0.0.1:11001".parse().unwrap());
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "host": "10.0.0.5", "timeout_ms": 500 }"#).unwrap();
        assert_eq!(config.host, "10.0.0.5".parse::<IpAddr>().unwrap());
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.send_port, DEFAULT_SEND_PORT);
        assert_eq!(config.unmatched_capacity, DEFAULT_UNMATCHED_CAPACITY);
    }

    #[test]
    fn env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("ABLETON_OSC_SEND_PORT", "12000"),
            ("ABLETON_OSC_TIMEOUT_MS", " 750 "),
            ("ABLETON_OSC_LISTEN_HOST", "0.0.0.0"),
        ]
        .into_iter()
        .collect();
        let config = Config::default()
            .with_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.send_port, 12000);
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert_eq!(config.receive_port, DEFAULT_RECEIVE_PORT);
        assert_eq!(config.listen_addr(), "0.0.0.0:11001".parse().unwrap());
    }

    #[test]
    fn env_overlay_rejects_garbage() {
        let err = Config::default()
            .with_vars(|key| (key == "ABLETON_OSC_SEND_PORT").then(|| "eleven".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref name, .. } if name == "ABLETON_OSC_SEND_PORT"));
    }
}
