//! TLS client context for exchange connections.
//!
//! Contexts are built once per connection right before the handshake.
//! Only TLS 1.2 and TLS 1.3 are offered; rustls has no SSLv2/SSLv3 support
//! and always uses ephemeral key exchange, so no extra options are needed
//! to rule those out.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Once};

use rustls::crypto::{CryptoProvider, ring};
use rustls::version::{TLS12, TLS13};
use rustls::{ClientConfig, RootCertStore};
use tokio_tungstenite::Connector;

use crate::error::{Error, Result};

// ============================================================================
// Crypto Provider
// ============================================================================

static INIT_CRYPTO: Once = Once::new();

/// Installs the ring provider as the process default.
///
/// The transport falls back to the process default when no explicit
/// configuration is supplied.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = ring::default_provider().install_default();
    });
}

// ============================================================================
// TlsContext
// ============================================================================

/// TLS configuration handed to the transport for one handshake.
///
/// A context without a configuration means construction failed and the
/// transport should use its own defaults.
#[derive(Debug, Clone, Default)]
pub struct TlsContext {
    config: Option<Arc<ClientConfig>>,
}

impl TlsContext {
    /// Builds a context restricted to TLS 1.2+ with webpki roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TlsConfig`] if the provider rejects the protocol
    /// version set.
    pub fn restricted() -> Result<Self> {
        init_crypto();

        let provider: Arc<CryptoProvider> = Arc::new(ring::default_provider());
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&TLS13, &TLS12])
            .map_err(|e| Error::tls_config(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            config: Some(Arc::new(config)),
        })
    }

    /// Creates a context that defers to the transport defaults.
    #[inline]
    #[must_use]
    pub fn fallback() -> Self {
        init_crypto();
        Self::default()
    }

    /// Returns `true` if an explicit configuration is present.
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Returns the rustls configuration, if any.
    #[inline]
    #[must_use]
    pub fn client_config(&self) -> Option<&Arc<ClientConfig>> {
        self.config.as_ref()
    }

    /// Converts into a tokio-tungstenite connector.
    #[must_use]
    pub fn connector(&self) -> Option<Connector> {
        self.config.clone().map(Connector::Rustls)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_context() {
        let context = TlsContext::restricted().expect("context should build");

        assert!(context.is_configured());
        assert!(context.connector().is_some());
        assert!(context.client_config().is_some());
    }

    #[test]
    fn test_fallback_context() {
        let context = TlsContext::fallback();

        assert!(!context.is_configured());
        assert!(context.connector().is_none());
    }
}
