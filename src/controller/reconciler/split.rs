//! # Certificate Splitter
//!
//! Splits a `tls.crt` bundle into the leaf certificate and the trust chain
//! ACM expects as separate fields.

use crate::constants::CERT_END_MARKER;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("certificate bundle has no '{CERT_END_MARKER}' trailer")]
    MissingTrailer,
}

/// Leaf certificate and chain borrowed from one bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitBundle<'a> {
    /// Bundle start through the first trailer, inclusive
    pub leaf: &'a [u8],
    /// Everything after the trailer, minus the separating newline
    pub chain: &'a [u8],
}

/// Split a PEM bundle at the first certificate trailer
///
/// # Errors
///
/// Returns `SplitError::MissingTrailer` when the bundle holds no complete
/// certificate block. The data itself is defective, so callers must not retry.
pub fn split_bundle(bundle: &[u8]) -> Result<SplitBundle<'_>, SplitError> {
    let marker = CERT_END_MARKER.as_bytes();
    let start = bundle
        .windows(marker.len())
        .position(|window| window == marker)
        .ok_or(SplitError::MissingTrailer)?;
    let end = start + marker.len();
    let (leaf, rest) = bundle.split_at(end);
    let chain = rest.strip_prefix(b"\n").unwrap_or(rest);
    Ok(SplitBundle { leaf, chain })
}
