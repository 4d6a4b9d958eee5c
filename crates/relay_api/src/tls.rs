//! Loading TLS material for the HTTPS listener.

use std::path::Path;
use std::sync::Arc;

use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::info;

use crate::errors::ServerError;

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;

/// Builds a TLS acceptor from a PEM certificate chain and private key.
///
/// # Errors
///
/// - `ServerError::TlsFile` if either file cannot be read
/// - `ServerError::TlsMaterial` if a file holds no usable PEM entry or the
///   key does not match the certificate
pub async fn build_tls_acceptor(
    cert_path: &Path,
    key_path: &Path,
) -> Result<TlsAcceptor, ServerError> {
    let certs = load_certs(cert_path).await?;
    let key = load_private_key(key_path).await?;

    let mut server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::TlsMaterial {
            path: cert_path.to_path_buf(),
            reason: e.to_string(),
        })?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    info!(cert = %cert_path.display(), "TLS enabled");
    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ServerError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ServerError::TlsFile {
            path: path.to_path_buf(),
            source,
        })
}

async fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let data = read_file(path).await?;
    let mut reader = std::io::BufReader::new(data.as_slice());

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::TlsMaterial {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if certs.is_empty() {
        return Err(ServerError::TlsMaterial {
            path: path.to_path_buf(),
            reason: "no certificates found".to_string(),
        });
    }
    Ok(certs)
}

async fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    let data = read_file(path).await?;
    let mut reader = std::io::BufReader::new(data.as_slice());

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| ServerError::TlsMaterial {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| ServerError::TlsMaterial {
            path: path.to_path_buf(),
            reason: "no private key found".to_string(),
        })
}
