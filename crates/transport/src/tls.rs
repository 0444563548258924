//! TLS bootstrap for the development security profile.
//!
//! With no explicit configuration the server presents a freshly generated
//! self-signed certificate and clients accept whatever is presented. Either
//! side can swap in real certificate handling through the options structs.

use std::sync::Arc;
use std::time::SystemTime;

/// ALPN identifier spoken by both sides.
pub const ALPN: &[u8] = b"jolt/1";

/// Errors producing the bootstrap TLS material.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Certificate generation failed
    #[error("certificate generation failed: {0}")]
    Generate(#[from] rcgen::RcgenError),
    /// rustls rejected the certificate material
    #[error("invalid certificate material: {0}")]
    Material(#[from] rustls::Error),
}

/// Server configuration with a fresh self-signed certificate.
pub fn self_signed_server_config() -> Result<quinn::ServerConfig, TlsError> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
    let cert_der = cert.serialize_der()?;
    let key_der = cert.serialize_private_key_der();

    let mut crypto = rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(
            vec![rustls::Certificate(cert_der)],
            rustls::PrivateKey(key_der),
        )?;
    crypto.alpn_protocols = vec![ALPN.to_vec()];

    Ok(quinn::ServerConfig::with_crypto(Arc::new(crypto)))
}

/// Client configuration that skips certificate verification.
pub fn insecure_client_config() -> quinn::ClientConfig {
    let mut crypto = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth();
    crypto.alpn_protocols = vec![ALPN.to_vec()];

    quinn::ClientConfig::new(Arc::new(crypto))
}

/// Verifier that accepts any server certificate.
///
/// Only suitable for point-to-point deployments where the peers trust the
/// network path out of band.
struct AcceptAnyCertificate;

impl rustls::client::ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::Certificate,
        _intermediates: &[rustls::Certificate],
        _server_name: &rustls::ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<rustls::client::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::ServerCertVerified::assertion())
    }
}
