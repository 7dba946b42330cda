//! Krypton configuration.

use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_COPPER_HOSTNAME_SUFFIX;
use super::error::{KryptonError, KryptonResult};

/// Datapath transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatapathProtocol {
    /// IPsec (ESP, or UDP encapsulated ESP).
    #[default]
    Ipsec,
    /// Bridge datapath.
    Bridge,
}

/// Configuration consumed by the selector and the handshake codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KryptonConfig {
    /// Whether IPv6 datapath addresses may be used.
    pub ipv6_enabled: bool,

    /// Datapath transport; drives the address family preference.
    pub datapath_protocol: DatapathProtocol,

    /// Accepted copper controller hostname suffixes. Must not contain
    /// an empty string.
    pub copper_hostname_suffix: Vec<String>,

    /// Default for the `enforce_copper_suffix` flag of response decoding.
    pub enforce_copper_suffix: bool,

    /// API key attached to public key requests.
    pub api_key: Option<String>,

    /// Send the OAuth token as an `Authorization` header instead of in the body.
    pub attach_oauth_token_as_header: bool,
}

impl Default for KryptonConfig {
    fn default() -> Self {
        Self {
            ipv6_enabled: true,
            datapath_protocol: DatapathProtocol::Ipsec,
            copper_hostname_suffix: vec![DEFAULT_COPPER_HOSTNAME_SUFFIX.to_string()],
            enforce_copper_suffix: true,
            api_key: None,
            attach_oauth_token_as_header: false,
        }
    }
}

impl KryptonConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> KryptonConfigBuilder {
        KryptonConfigBuilder::new()
    }

    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json(content: &str) -> KryptonResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| KryptonError::Config(format!("invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the codec relies on.
    pub fn validate(&self) -> KryptonResult<()> {
        // An empty suffix matches every hostname.
        if self.copper_hostname_suffix.iter().any(|s| s.is_empty()) {
            return Err(KryptonError::Config(
                "copper_hostname_suffix must not contain an empty suffix".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`KryptonConfig`].
#[derive(Debug)]
pub struct KryptonConfigBuilder {
    config: KryptonConfig,
}

impl KryptonConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: KryptonConfig::default(),
        }
    }

    /// Enable or disable IPv6 datapath addresses.
    pub fn ipv6_enabled(mut self, enabled: bool) -> Self {
        self.config.ipv6_enabled = enabled;
        self
    }

    /// Set the datapath protocol.
    pub fn datapath_protocol(mut self, protocol: DatapathProtocol) -> Self {
        self.config.datapath_protocol = protocol;
        self
    }

    /// Replace the accepted copper hostname suffixes.
    pub fn copper_hostname_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.copper_hostname_suffix = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default suffix enforcement flag.
    pub fn enforce_copper_suffix(mut self, enforce: bool) -> Self {
        self.config.enforce_copper_suffix = enforce;
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Send the OAuth token as a header.
    pub fn attach_oauth_token_as_header(mut self, attach: bool) -> Self {
        self.config.attach_oauth_token_as_header = attach;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> KryptonResult<KryptonConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for KryptonConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
