//! Gateway client configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder the provider swaps for the real session id on redirect back.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Hosted checkout settings, as read from the `[gateway]` config section.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostedCheckoutConfig {
    /// Provider API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API secret. Blank means "not configured".
    #[serde(default)]
    pub secret_key: String,

    /// Where the provider sends the shopper after paying.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    /// Where the provider sends the shopper on cancel.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,

    /// Base URL of the hosted payment page, for providers that return only an id.
    #[serde(default)]
    pub hosted_page_base: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_success_url() -> String {
    format!(
        "http://localhost:3000/stripe/purchase-success?session_id={}",
        SESSION_ID_PLACEHOLDER
    )
}

fn default_cancel_url() -> String {
    "http://localhost:3000/cart".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HostedCheckoutConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            hosted_page_base: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HostedCheckoutConfig {
    /// Config for a provider at `base_url` with the given secret.
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    pub fn with_return_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.success_url = success_url.into();
        self.cancel_url = cancel_url.into();
        self
    }

    pub fn with_hosted_page_base(mut self, base: impl Into<String>) -> Self {
        self.hosted_page_base = Some(base.into());
        self
    }

    pub fn has_secret(&self) -> bool {
        !self.secret_key.trim().is_empty()
    }

    /// Problems that would make every checkout fail.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.has_secret() {
            problems.push("gateway.secret_key is not set".to_string());
        }
        if reqwest::Url::parse(&self.base_url).is_err() {
            problems.push(format!("gateway.base_url '{}' is not a valid URL", self.base_url));
        }
        if !self.success_url.contains(SESSION_ID_PLACEHOLDER) {
            problems.push(format!(
                "gateway.success_url should contain {}",
                SESSION_ID_PLACEHOLDER
            ));
        }
        if self.timeout_secs == 0 {
            problems.push("gateway.timeout_secs must be positive".to_string());
        }
        problems
    }
}

impl fmt::Debug for HostedCheckoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedCheckoutConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &if self.has_secret() { "<redacted>" } else { "<unset>" })
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .field("hosted_page_base", &self.hosted_page_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
