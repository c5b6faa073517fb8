//! Utility functions for getting hashes
use sha2::{Digest, Sha256};

use crate::network::entity::KoAnnotation;

const UNIT_SEPARATOR: u8 = 0x1f;
const RECORD_SEPARATOR: u8 = 0x1e;

/// Hex encoded SHA-256 digest of a sequence of byte chunks, fed in order
pub(crate) fn sha256_hex<I, B>(chunks: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.as_ref());
    }
    hex::encode(hasher.finalize())
}

/// Compute the fingerprint of a set of gene-KO annotations
///
/// The fingerprint does not depend on the order of `annotations`: records are sorted by
/// entity ID, KO ID, KO name and score before hashing. It changes whenever any
/// (entity, KO, name, score) tuple is added, removed or altered, so comparing it with a
/// previously stored value tells whether a stored network was made from the same
/// annotations.
///
/// # Examples
/// ```rust
/// use kornet_core::network::entity::KoAnnotation;
/// use kornet_core::utils::hashing::annotation_fingerprint;
/// let a = KoAnnotation::new("1", "K00001", "alcohol dehydrogenase", 1e-20);
/// let b = KoAnnotation::new("2", "K00002", "alcohol dehydrogenase (NADP+)", 3e-5);
/// assert_eq!(
///     annotation_fingerprint(&[a.clone(), b.clone()]),
///     annotation_fingerprint(&[b, a])
/// );
/// ```
pub fn annotation_fingerprint(annotations: &[KoAnnotation]) -> String {
    let mut sorted: Vec<&KoAnnotation> = annotations.iter().collect();
    sorted.sort_by(|a, b| {
        a.entity_id
            .cmp(&b.entity_id)
            .then_with(|| a.ko_id.cmp(&b.ko_id))
            .then_with(|| a.ko_name.cmp(&b.ko_name))
            .then_with(|| a.score.total_cmp(&b.score))
    });

    let mut hasher = Sha256::new();
    for annotation in sorted {
        hasher.update(annotation.entity_id.as_bytes());
        hasher.update([UNIT_SEPARATOR]);
        hasher.update(annotation.ko_id.as_bytes());
        hasher.update([UNIT_SEPARATOR]);
        hasher.update(annotation.ko_name.as_bytes());
        hasher.update([UNIT_SEPARATOR]);
        hasher.update(annotation.score.to_string().as_bytes());
        hasher.update([RECORD_SEPARATOR]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations() -> Vec<KoAnnotation> {
        vec![
            KoAnnotation::new("7", "K00845", "glucokinase", 1e-50),
            KoAnnotation::new("12", "K01810", "glucose-6-phosphate isomerase", 2.5e-30),
            KoAnnotation::new("12", "K00845", "glucokinase", 4e-10),
            KoAnnotation::new("3", "K00850", "6-phosphofructokinase 1", 0.001),
        ]
    }

    #[test]
    fn order_independent() {
        let forward = annotations();
        let mut reversed = annotations();
        reversed.reverse();
        let mut rotated = annotations();
        rotated.rotate_left(2);
        let fingerprint = annotation_fingerprint(&forward);
        assert_eq!(fingerprint, annotation_fingerprint(&reversed));
        assert_eq!(fingerprint, annotation_fingerprint(&rotated));
        assert_eq!(fingerprint.len(), 64);
    }

    #[test]
    fn sensitive_to_changes() {
        let original = annotation_fingerprint(&annotations());

        let mut score_changed = annotations();
        score_changed[2].score = 5e-10;
        assert_ne!(original, annotation_fingerprint(&score_changed));

        let mut ko_changed = annotations();
        ko_changed[0].ko_id = "K00844".to_string();
        assert_ne!(original, annotation_fingerprint(&ko_changed));

        let mut entity_changed = annotations();
        entity_changed[3].entity_id = "4".to_string();
        assert_ne!(original, annotation_fingerprint(&entity_changed));

        let mut removed = annotations();
        removed.pop();
        assert_ne!(original, annotation_fingerprint(&removed));
    }

    #[test]
    fn fields_do_not_run_together() {
        let a = vec![KoAnnotation::new("1", "K00001", "x", 1.0)];
        let b = vec![KoAnnotation::new("1K", "00001", "x", 1.0)];
        assert_ne!(annotation_fingerprint(&a), annotation_fingerprint(&b));
    }

    #[test]
    fn sha256_of_chunks() {
        assert_eq!(
            sha256_hex(["ab", "c"]),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
