use crate::fingerprint::sha256_hex;
use crate::model::{Evidence, Indicator};
use crate::policy::ExpectedSignature;
use crate::probe::PackageProbe;
use deviceguard_types::{Category, ids};

/// Compare the application's own signing identity with the expected one.
///
/// Fails closed: an unreadable or empty signature counts as tampered.
pub fn detect_tamper(pkg: &dyn PackageProbe, expected: &ExpectedSignature) -> Indicator {
    let evidence = match pkg.own_signature() {
        Ok(observed) if observed.is_empty() => {
            tracing::warn!("own signature is empty; treating as tampered");
            Some(Evidence::new(
                ids::CODE_SIGNATURE_UNVERIFIABLE,
                "signature is empty",
            ))
        }
        Ok(observed) if expected.matches(&observed) => None,
        Ok(observed) => Some(Evidence::new(
            ids::CODE_SIGNATURE_MISMATCH,
            format!("observed sha256:{}", sha256_hex(observed.as_bytes())),
        )),
        Err(err) => {
            tracing::warn!(error = %err, "own signature unreadable; treating as tampered");
            Some(Evidence::new(ids::CODE_SIGNATURE_UNVERIFIABLE, err.to_string()))
        }
    };

    Indicator::from_evidence(Category::Tamper, evidence)
}
