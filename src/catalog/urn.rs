//! URN normalization
//!
//! Item-instance URNs carry a trailing token id
//! (`urn:decentraland:matic:collections-v2:0xabc:0:1234`). Item-class and
//! item-instance URNs must share one catalog entry, so the token id is
//! stripped before lookup.

const SEPARATOR: char = ':';
const INSTANCE_SEPARATOR_COUNT: usize = 6;

/// Canonical cache key for a URN
pub fn normalize(urn: &str) -> String {
    let trimmed = urn.trim();
    let separators = trimmed.matches(SEPARATOR).count();

    let base = if separators == INSTANCE_SEPARATOR_COUNT {
        match trimmed.rfind(SEPARATOR) {
            Some(index) => &trimmed[..index],
            None => trimmed,
        }
    } else {
        trimmed
    };

    base.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_token_id_from_instance_urn() {
        assert_eq!(
            normalize("urn:decentraland:matic:collections-v2:0xAbC:0:105312291668557186697918"),
            "urn:decentraland:matic:collections-v2:0xabc:0"
        );
    }

    #[test]
    fn leaves_class_urns_alone() {
        assert_eq!(
            normalize("urn:decentraland:matic:collections-v2:0xabc:0"),
            "urn:decentraland:matic:collections-v2:0xabc:0"
        );
        assert_eq!(
            normalize("urn:decentraland:off-chain:base-avatars:BaseMale"),
            "urn:decentraland:off-chain:base-avatars:basemale"
        );
    }

    #[test]
    fn counts_separators_exactly() {
        let seven = "a:b:c:d:e:f:g:h";
        assert_eq!(normalize(seven), seven);
    }
}
