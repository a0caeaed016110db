//! Payment gateway seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::CheckoutRequest;
use crate::error::CommerceError;

/// Opaque session returned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Provider session identifier.
    pub handle: String,
    /// Hosted page URL, when the provider returns one directly.
    #[serde(default)]
    pub url: Option<String>,
}

impl GatewaySession {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Where to send the shopper next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub url: String,
}

/// Gateway client errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network failure, timeout or provider outage.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with an error status.
    #[error("Rejected by gateway ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider answered without a usable session handle.
    #[error("Gateway returned no session handle")]
    MissingHandle,

    /// Credentials or endpoint are unusable.
    #[error("Gateway misconfigured: {0}")]
    Misconfigured(String),
}

impl From<GatewayError> for CommerceError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Misconfigured(msg) => CommerceError::GatewayMisconfigured(msg),
            other => CommerceError::Gateway(other.to_string()),
        }
    }
}

/// An external hosted-payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for the request.
    async fn create_session(&self, request: &CheckoutRequest)
        -> Result<GatewaySession, GatewayError>;

    /// Navigation target for a session.
    fn redirect(&self, session: &GatewaySession) -> Result<Redirect, GatewayError>;
}

#[async_trait]
impl<G: PaymentGateway + ?Sized> PaymentGateway for std::sync::Arc<G> {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError> {
        (**self).create_session(request).await
    }

    fn redirect(&self, session: &GatewaySession) -> Result<Redirect, GatewayError> {
        (**self).redirect(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_error_mapping() {
        let err: CommerceError = GatewayError::Misconfigured("no key".into()).into();
        assert!(matches!(err, CommerceError::GatewayMisconfigured(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err: CommerceError = GatewayError::Rejected {
            status: 402,
            message: "card declined".into(),
        }
        .into();
        assert!(matches!(err, CommerceError::Gateway(_)));
        assert_eq!(err.status_code(), 502);

        let err: CommerceError = GatewayError::MissingHandle.into();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }
}
