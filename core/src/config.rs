//! Client configuration and paste submission defaults.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_HOST: &str = "ghostbin.com";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_LANG: &str = "text";

/// `ghostbin-core/<crate version>`.
pub fn default_user_agent() -> String {
    format!("ghostbin-core/{}", env!("CARGO_PKG_VERSION"))
}

/// Per-instance configuration for `GhostbinClient`.
///
/// Deserializable so an embedding application can keep it in its own config
/// file; `timeout` is given in whole seconds there.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `hostname[:port]`, without scheme.
    pub host: String,
    pub user_agent: String,
    pub scheme: String,
    #[serde(deserialize_with = "deserialize_timeout_secs")]
    pub timeout: Option<Duration>,
    /// Largest response body accepted, in bytes. `None` reads bodies in full.
    pub max_body_size: Option<u64>,
    pub defaults: PasteDefaults,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            user_agent: default_user_agent(),
            scheme: DEFAULT_SCHEME.to_string(),
            timeout: None,
            max_body_size: None,
            defaults: PasteDefaults::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_body_size(mut self, limit: u64) -> Self {
        self.max_body_size = Some(limit);
        self
    }

    /// Merge `defaults` over the built-in defaults.
    pub fn with_defaults(mut self, defaults: PasteOptions) -> Self {
        self.defaults.update(defaults);
        self
    }

    /// `scheme://host`, the prefix of every URL the client builds.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

fn deserialize_timeout_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

/// Values used for paste fields the caller leaves unset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasteDefaults {
    pub password: Option<String>,
    pub expire: Option<String>,
    pub lang: String,
}

impl Default for PasteDefaults {
    fn default() -> Self {
        Self {
            password: None,
            expire: None,
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl PasteDefaults {
    /// Replace every field that is `Some` in `update`; keep the rest.
    pub fn update(&mut self, update: PasteOptions) {
        if let Some(password) = update.password {
            self.password = Some(password);
        }
        if let Some(expire) = update.expire {
            self.expire = Some(expire);
        }
        if let Some(lang) = update.lang {
            self.lang = lang;
        }
    }
}

/// Optional paste fields, used both per submission and as a defaults update.
///
/// `password: Some("")` means "explicitly no password". An empty `expire` or
/// `lang` falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasteOptions {
    pub password: Option<String>,
    pub expire: Option<String>,
    pub lang: Option<String>,
}

impl PasteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn expire(mut self, expire: &str) -> Self {
        self.expire = Some(expire.to_string());
        self
    }

    pub fn lang(mut self, lang: &str) -> Self {
        self.lang = Some(lang.to_string());
        self
    }
}
