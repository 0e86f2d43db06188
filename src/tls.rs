//! TLS settings for the GitLab HTTP agent.
//!
//! Self-hosted GitLab instances often sit behind a private CA or a
//! self-signed certificate, so verification can be switched between:
//! - `Verify` - the bundled Mozilla roots (webpki-roots)
//! - `CustomBundle` - only the certificates from a PEM file
//! - `SkipVerify` - no certificate verification at all

use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, ring, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Certificate verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsSettings {
    /// Verify against the bundled public roots
    #[default]
    Verify,
    /// Verify against the certificates in a PEM bundle only
    CustomBundle(PathBuf),
    /// Accept any server certificate
    SkipVerify,
}

impl TlsSettings {
    /// Build settings from the CLI flags.
    ///
    /// `--no-verify-ssl` takes precedence over `--ca-bundle`.
    pub fn from_flags(no_verify_ssl: bool, ca_bundle: Option<PathBuf>) -> Self {
        match (no_verify_ssl, ca_bundle) {
            (true, _) => TlsSettings::SkipVerify,
            (false, Some(path)) => TlsSettings::CustomBundle(path),
            (false, None) => TlsSettings::Verify,
        }
    }

    /// Check if certificates are verified at all.
    pub fn is_verification_enabled(&self) -> bool {
        !matches!(self, TlsSettings::SkipVerify)
    }
}

/// Build the rustls client configuration for the given settings.
pub fn client_config(settings: &TlsSettings) -> Result<Arc<ClientConfig>> {
    let provider = Arc::new(ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Config(format!("TLS setup failed: {}", e)))?;

    let config = match settings {
        TlsSettings::Verify => builder
            .with_root_certificates(public_roots())
            .with_no_client_auth(),
        TlsSettings::CustomBundle(path) => builder
            .with_root_certificates(load_ca_bundle(path)?)
            .with_no_client_auth(),
        TlsSettings::SkipVerify => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth(),
    };

    Ok(Arc::new(config))
}

fn public_roots() -> RootCertStore {
    RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    }
}

/// Load every certificate from a PEM file into a root store.
fn load_ca_bundle(path: &Path) -> Result<RootCertStore> {
    let file = File::open(path).map_err(|e| {
        Error::Config(format!("Cannot read CA bundle {}: {}", path.display(), e))
    })?;
    let mut reader = BufReader::new(file);

    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(|e| {
            Error::Config(format!("Invalid PEM in CA bundle {}: {}", path.display(), e))
        })?;
        roots.add(cert).map_err(|e| {
            Error::Config(format!(
                "Rejected certificate in CA bundle {}: {}",
                path.display(),
                e
            ))
        })?;
    }

    if roots.is_empty() {
        return Err(Error::Config(format!(
            "No certificates found in CA bundle {}",
            path.display()
        )));
    }

    Ok(roots)
}

/// Verifier used with `--no-verify-ssl`.
///
/// Handshake signatures are still checked so the connection is encrypted
/// to whoever holds the presented key; only the chain of trust is skipped.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
