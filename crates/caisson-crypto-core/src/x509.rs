//! X.509 certificate and PKCS#10 CSR decoding.
//!
//! This module provides:
//! - [`decode_pem`] — dispatch a PEM armor to certificate or CSR
//!   parsing and extract the fields terminal tooling displays
//! - [`DecodedDocument`] — tagged union over the recognized shapes
//!
//! Decoding is read-only: signatures are reported, never verified —
//! chain validation belongs to the PKI layer, not a field viewer.

use crate::error::CryptoError;
use der::{Decode, Encode};
use serde::{Deserialize, Serialize};
use x509_cert::request::CertReq;
use x509_cert::Certificate;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PEM labels recognized by [`decode_pem`].
const LABEL_CERTIFICATE: &str = "CERTIFICATE";
const LABEL_CSR: &str = "CERTIFICATE REQUEST";
const LABEL_CSR_LEGACY: &str = "NEW CERTIFICATE REQUEST";

/// A decoded PEM document. Match exhaustively; `Unknown` carries the
/// armor label so callers can report what they actually received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DecodedDocument {
    /// An X.509 certificate.
    Certificate(CertificateInfo),
    /// A PKCS#10 certification request.
    Csr(CsrInfo),
    /// A syntactically valid PEM with an unrecognized label.
    Unknown {
        /// The armor label, e.g. `EC PRIVATE KEY`.
        label: String,
    },
}

/// Fields extracted from a certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Subject distinguished name (RFC 4514 rendering).
    pub subject: String,
    /// Issuer distinguished name.
    pub issuer: String,
    /// X.509 version number (1–3).
    pub version: u8,
    /// Serial number, uppercase hex.
    pub serial_number: String,
    /// Signature algorithm, named when well-known, dotted OID otherwise.
    pub signature_algorithm: String,
    /// Validity start, RFC 3339-style.
    pub not_before: String,
    /// Validity end, RFC 3339-style.
    pub not_after: String,
    /// Subject public key summary.
    pub public_key: PublicKeyInfo,
    /// Extensions, in order of appearance.
    pub extensions: Vec<ExtensionInfo>,
}

/// Fields extracted from a certification request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrInfo {
    /// Subject distinguished name.
    pub subject: String,
    /// CSR version number (0 for PKCS#10 v1).
    pub version: u8,
    /// Signature algorithm on the request.
    pub signature_algorithm: String,
    /// Requested public key summary.
    pub public_key: PublicKeyInfo,
    /// Request attributes (e.g. requested extensions, challenge password).
    pub attributes: Vec<AttributeInfo>,
}

/// Subject-public-key summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyInfo {
    /// Key algorithm, named when well-known.
    pub algorithm: String,
    /// Full SubjectPublicKeyInfo DER, uppercase hex.
    pub spki_der: String,
}

/// One certificate extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Extension OID, dotted.
    pub oid: String,
    /// Criticality flag.
    pub critical: bool,
    /// Raw extension value, uppercase hex.
    pub value: String,
}

/// One CSR attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Attribute OID, dotted.
    pub oid: String,
    /// Attribute values, each the uppercase hex of its DER encoding.
    pub values: Vec<String>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a PEM document into certificate or CSR fields.
///
/// Recognized armors: `CERTIFICATE`, `CERTIFICATE REQUEST`, and the
/// legacy `NEW CERTIFICATE REQUEST`. Any other label decodes to
/// [`DecodedDocument::Unknown`].
///
/// # Errors
///
/// [`CryptoError::Pem`] for broken armor or base64;
/// [`CryptoError::Structure`] when the DER under a recognized label
/// does not parse as that document type.
pub fn decode_pem(pem: &str) -> Result<DecodedDocument, CryptoError> {
    let (label, der_bytes) = pem_rfc7468::decode_vec(pem.trim().as_bytes())
        .map_err(|e| CryptoError::Pem(format!("PEM decode failed: {e}")))?;

    tracing::debug!(label, der_len = der_bytes.len(), "decoding PEM document");

    match label {
        LABEL_CERTIFICATE => {
            let certificate = Certificate::from_der(&der_bytes).map_err(|e| {
                CryptoError::Structure(format!("certificate DER parse failed: {e}"))
            })?;
            Ok(DecodedDocument::Certificate(describe_certificate(
                &certificate,
            )?))
        }
        LABEL_CSR | LABEL_CSR_LEGACY => {
            let request = CertReq::from_der(&der_bytes)
                .map_err(|e| CryptoError::Structure(format!("CSR DER parse failed: {e}")))?;
            Ok(DecodedDocument::Csr(describe_csr(&request)?))
        }
        other => Ok(DecodedDocument::Unknown {
            label: other.to_owned(),
        }),
    }
}

fn describe_certificate(certificate: &Certificate) -> Result<CertificateInfo, CryptoError> {
    let tbs = &certificate.tbs_certificate;

    let extensions = tbs
        .extensions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|ext| ExtensionInfo {
            oid: ext.extn_id.to_string(),
            critical: ext.critical,
            value: crate::hex::encode_upper(ext.extn_value.as_bytes()),
        })
        .collect();

    Ok(CertificateInfo {
        subject: tbs.subject.to_string(),
        issuer: tbs.issuer.to_string(),
        version: version_number(tbs.version),
        serial_number: crate::hex::encode_upper(tbs.serial_number.as_bytes()),
        signature_algorithm: algorithm_name(&certificate.signature_algorithm.oid),
        not_before: tbs.validity.not_before.to_date_time().to_string(),
        not_after: tbs.validity.not_after.to_date_time().to_string(),
        public_key: describe_spki(&tbs.subject_public_key_info)?,
        extensions,
    })
}

fn describe_csr(request: &CertReq) -> Result<CsrInfo, CryptoError> {
    let info = &request.info;

    let attributes = info
        .attributes
        .iter()
        .map(|attr| {
            let values = attr
                .values
                .iter()
                .map(|value| {
                    value
                        .to_der()
                        .map(|der| crate::hex::encode_upper(&der))
                        .map_err(|e| {
                            CryptoError::Structure(format!("attribute re-encode failed: {e}"))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AttributeInfo {
                oid: attr.oid.to_string(),
                values,
            })
        })
        .collect::<Result<Vec<_>, CryptoError>>()?;

    Ok(CsrInfo {
        subject: info.subject.to_string(),
        version: info.version as u8,
        signature_algorithm: algorithm_name(&request.algorithm.oid),
        public_key: describe_spki(&info.public_key)?,
        attributes,
    })
}

fn describe_spki(
    spki: &x509_cert::spki::SubjectPublicKeyInfoOwned,
) -> Result<PublicKeyInfo, CryptoError> {
    let der = spki
        .to_der()
        .map_err(|e| CryptoError::Structure(format!("SPKI re-encode failed: {e}")))?;
    Ok(PublicKeyInfo {
        algorithm: algorithm_name(&spki.algorithm.oid),
        spki_der: crate::hex::encode_upper(&der),
    })
}

fn version_number(version: x509_cert::Version) -> u8 {
    match version {
        x509_cert::Version::V1 => 1,
        x509_cert::Version::V2 => 2,
        x509_cert::Version::V3 => 3,
    }
}

/// Map well-known algorithm OIDs to their conventional names.
fn algorithm_name(oid: &der::asn1::ObjectIdentifier) -> String {
    match oid.to_string().as_str() {
        "1.2.840.113549.1.1.1" => "rsaEncryption".to_owned(),
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption".to_owned(),
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption".to_owned(),
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption".to_owned(),
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption".to_owned(),
        "1.2.840.10045.2.1" => "id-ecPublicKey".to_owned(),
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256".to_owned(),
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384".to_owned(),
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512".to_owned(),
        dotted => dotted.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
