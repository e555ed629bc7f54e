use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub filter: FilterConfig,
    pub responder: ResponderConfig,
    pub transport: TransportConfig,
    pub timing: TimingConfig,
}

/// Contact admission lists, as raw entries (normalized when the filter is
/// built).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Allow list. Empty means everyone is allowed.
    pub included_only: Vec<String>,
    /// Deny list. Always checked, wins over the allow list.
    pub excluded: Vec<String>,
}

/// Remote response service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Base URL of the response service.
    pub base_url: String,
    /// Per-call timeout budget, in seconds.
    pub timeout_secs: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 100,
        }
    }
}

/// Sidecar transport link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// WebSocket endpoint of the Baileys sidecar.
    pub sidecar_url: String,
    /// Initial connect attempts before giving up at startup.
    pub connect_attempts: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            sidecar_url: "ws://127.0.0.1:3001".into(),
            connect_attempts: 10,
        }
    }
}

/// Human-latency timing policy. These shape the feel of replies, never their
/// correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed delay before the responder call.
    pub pre_reply_delay_ms: u64,
    /// Lower bound of the randomized "thinking" delay before dispatch.
    pub thinking_min_ms: u64,
    /// Upper bound of the randomized "thinking" delay before dispatch.
    pub thinking_max_ms: u64,
    /// How long the typing indicator stays on before pausing.
    pub typing_duration_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pre_reply_delay_ms: 10,
            thinking_min_ms: 500,
            thinking_max_ms: 2000,
            typing_duration_ms: 2000,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let cfg = RelayConfig::default();
        assert!(cfg.filter.included_only.is_empty());
        assert!(cfg.filter.excluded.is_empty());
        assert_eq!(cfg.responder.base_url, "http://localhost:8000");
        assert_eq!(cfg.responder.timeout_secs, 100);
        assert_eq!(cfg.timing.pre_reply_delay_ms, 10);
        assert_eq!(cfg.timing.thinking_min_ms, 500);
        assert_eq!(cfg.timing.thinking_max_ms, 2000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: RelayConfig = toml::from_str(
            r#"
            [filter]
            excluded = ["+3361"]

            [responder]
            base_url = "http://10.0.0.2:9000"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.filter.excluded, vec!["+3361"]);
        assert!(cfg.filter.included_only.is_empty());
        assert_eq!(cfg.responder.base_url, "http://10.0.0.2:9000");
        assert_eq!(cfg.responder.timeout_secs, 100);
        assert_eq!(cfg.transport.sidecar_url, "ws://127.0.0.1:3001");
    }
}
