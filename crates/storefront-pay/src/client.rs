//! HTTP client for a hosted checkout provider.
//!
//! Opens one payment session per [`CheckoutRequest`] with
//! `POST {base_url}/v1/checkout/sessions` and maps every failure onto
//! [`GatewayError`]. There is no retry: a failed call fails the attempt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use storefront_commerce::checkout::{
    CheckoutRequest, GatewayError, GatewaySession, PaymentGateway, Redirect,
};

use crate::config::HostedCheckoutConfig;
use crate::wire::{ErrorEnvelope, SessionCreateBody, SessionResponse};

const SESSIONS_PATH: &str = "v1/checkout/sessions";

/// Payment gateway backed by a hosted checkout HTTP API.
pub struct HostedCheckoutClient {
    client: Client,
    config: HostedCheckoutConfig,
    sessions_url: Url,
}

impl HostedCheckoutClient {
    /// Build a client from config.
    ///
    /// A missing secret is not an error here; it fails the first
    /// [`create_session`](PaymentGateway::create_session) call instead, so a
    /// storefront can still run its cart without payment credentials.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Misconfigured`] if `base_url` is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(config: HostedCheckoutConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Misconfigured(format!("http client: {e}")))?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let sessions_url = Url::parse(&normalised)
            .and_then(|base| base.join(SESSIONS_PATH))
            .map_err(|e| {
                GatewayError::Misconfigured(format!("invalid base URL '{}': {e}", config.base_url))
            })?;

        Ok(Self {
            client,
            config,
            sessions_url,
        })
    }

    pub fn config(&self) -> &HostedCheckoutConfig {
        &self.config
    }

    /// Session creation endpoint.
    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    async fn send(&self, request: &CheckoutRequest) -> Result<GatewaySession, GatewayError> {
        if !self.config.has_secret() {
            return Err(GatewayError::Misconfigured("secret key is not set".to_string()));
        }

        let body = SessionCreateBody::from_request(request, &self.config)
            .map_err(|e| GatewayError::Transport(format!("encoding request: {e}")))?;

        tracing::debug!(
            checkout_id = %request.checkout_id,
            url = %self.sessions_url,
            lines = body.line_items.len(),
            total_cents = body.charged_total(),
            "creating payment session"
        );

        let response = self
            .client
            .post(self.sessions_url.clone())
            .bearer_auth(&self.config.secret_key)
            .header("Idempotency-Key", request.checkout_id.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(describe(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(describe(&e)))?;

        if !status.is_success() {
            return Err(rejection(status, &text));
        }

        let parsed: SessionResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Transport(format!("unreadable session response: {e}")))?;

        match parsed.id {
            Some(id) if !id.trim().is_empty() => Ok(GatewaySession {
                handle: id,
                url: parsed.url.filter(|u| !u.trim().is_empty()),
            }),
            _ => Err(GatewayError::MissingHandle),
        }
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.send(request).await
    }

    fn redirect(&self, session: &GatewaySession) -> Result<Redirect, GatewayError> {
        if let Some(url) = &session.url {
            return Ok(Redirect { url: url.clone() });
        }
        match &self.config.hosted_page_base {
            Some(base) if !session.handle.is_empty() => Ok(Redirect {
                url: format!("{}/{}", base.trim_end_matches('/'), session.handle),
            }),
            _ => Err(GatewayError::MissingHandle),
        }
    }
}

/// Credentials problems are configuration errors; anything else is a rejection.
fn rejection(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::Misconfigured(format!("credentials rejected ({status}): {message}"))
        }
        _ => GatewayError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
