/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Decode FreeBSD package version strings into comparable keys
    and decide whether a remote version supersedes a local one.

  Security / Safety Notes:
    Pure computation; no I/O, no external command execution.

  Dependencies:
    None beyond std.

  Operational Scope:
    Consulted by the report builder for every package present
    in both the local inventory and the remote index.

  Revision History:
    2025-11-12 COD  Authored version key codec and comparison.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Total functions with explicit fallback paths
    - Conservative resolution of undecidable comparisons
    - Deterministic encoding for reproducible decisions
============================================================*/

/// Positional base for packing dot/comma separated components.
/// Components of 100 or more overflow their slot; such versions
/// fall outside the guarantee and are compared as packed sums.
const COMPONENT_BASE: u64 = 100;

/// One half of a version key: a packed integer when every
/// component was numeric, the raw substring otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPart {
    Numeric(u64),
    Raw(String),
}

/// Comparable representation of a version string, split at the
/// first underscore into release prefix and revision suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    pub prefix: VersionPart,
    pub suffix: VersionPart,
}

impl VersionKey {
    /// Decode a version string. Total: any component that fails to
    /// parse demotes its half of the key to a raw string.
    pub fn decode(version: &str) -> Self {
        let (prefix_str, suffix_str) = match version.split_once('_') {
            Some((prefix, suffix)) => (prefix, Some(suffix)),
            None => (version, None),
        };

        let suffix = match suffix_str {
            Some(raw) => pack_components(raw, ','),
            None => VersionPart::Numeric(0),
        };
        let prefix = pack_components(prefix_str, '.');

        VersionKey { prefix, suffix }
    }
}

/// Fold separator-delimited numeric components into one integer,
/// `acc = acc * 100 + component`. Any unparsable component (or a
/// packed value exceeding u64) yields the raw substring instead.
fn pack_components(raw: &str, separator: char) -> VersionPart {
    let mut packed: u64 = 0;
    for component in raw.split(separator) {
        let value = match component.parse::<u64>() {
            Ok(value) => value,
            Err(_) => return VersionPart::Raw(raw.to_string()),
        };
        packed = match packed
            .checked_mul(COMPONENT_BASE)
            .and_then(|acc| acc.checked_add(value))
        {
            Some(acc) => acc,
            None => return VersionPart::Raw(raw.to_string()),
        };
    }
    VersionPart::Numeric(packed)
}

/// Outcome of comparing one key half against its remote twin.
enum PartCmp {
    Newer,
    Equal,
    Older,
    Divergent,
}

fn cmp_parts(local: &VersionPart, remote: &VersionPart) -> PartCmp {
    use std::cmp::Ordering;
    let ordering = match (local, remote) {
        (VersionPart::Numeric(l), VersionPart::Numeric(r)) => r.cmp(l),
        (VersionPart::Raw(l), VersionPart::Raw(r)) => r.cmp(l),
        // Numeric against raw is undecidable; resolved by the caller
        // as "remote is newer" so odd versions never mask an update.
        _ => return PartCmp::Divergent,
    };
    match ordering {
        Ordering::Greater => PartCmp::Newer,
        Ordering::Equal => PartCmp::Equal,
        Ordering::Less => PartCmp::Older,
    }
}

/// Return true if the remote version supersedes the local one.
pub fn remote_is_newer(local: &str, remote: &str) -> bool {
    let local_key = VersionKey::decode(local);
    let remote_key = VersionKey::decode(remote);

    match cmp_parts(&local_key.prefix, &remote_key.prefix) {
        PartCmp::Newer | PartCmp::Divergent => true,
        PartCmp::Older => false,
        PartCmp::Equal => matches!(
            cmp_parts(&local_key.suffix, &remote_key.suffix),
            PartCmp::Newer | PartCmp::Divergent
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_deterministic() {
        for version in ["4.0.1_4", "2024g", "1.19,1", "3.11.13_1"] {
            assert_eq!(VersionKey::decode(version), VersionKey::decode(version));
        }
    }

    #[test]
    fn decode_packs_numeric_components() {
        let key = VersionKey::decode("4.0.1_4");
        assert_eq!(key.prefix, VersionPart::Numeric(4 * 100 * 100 + 1));
        assert_eq!(key.suffix, VersionPart::Numeric(4));
    }

    #[test]
    fn decode_missing_suffix_is_zero() {
        let key = VersionKey::decode("2.0");
        assert_eq!(key.suffix, VersionPart::Numeric(0));
    }

    #[test]
    fn decode_non_numeric_prefix_falls_back_to_raw() {
        let key = VersionKey::decode("2024g_1");
        assert_eq!(key.prefix, VersionPart::Raw("2024g".to_string()));
        assert_eq!(key.suffix, VersionPart::Numeric(1));
    }

    #[test]
    fn decode_comma_suffix_packs() {
        // Epoch-style suffix as found in ports like gettext 1.19,1
        let key = VersionKey::decode("1.19_2,1");
        assert_eq!(key.suffix, VersionPart::Numeric(2 * 100 + 1));
    }

    #[test]
    fn prefix_ordering() {
        assert!(remote_is_newer("1.0", "1.1"));
        assert!(!remote_is_newer("1.1", "1.0"));
        assert!(!remote_is_newer("1.0", "1.0"));
    }

    #[test]
    fn suffix_ordering() {
        assert!(remote_is_newer("2.0_3", "2.0_4"));
        assert!(!remote_is_newer("2.0_4", "2.0_3"));
    }

    #[test]
    fn absent_suffix_is_older_than_any_revision() {
        assert!(remote_is_newer("2.0", "2.0_1"));
        assert!(!remote_is_newer("2.0_1", "2.0"));
    }

    #[test]
    fn divergent_parts_resolve_to_newer() {
        assert!(remote_is_newer("abc", "1.0"));
        assert!(remote_is_newer("1.0", "abc"));
    }

    #[test]
    fn raw_prefixes_compare_lexicographically() {
        assert!(remote_is_newer("2024a", "2024g"));
        assert!(!remote_is_newer("2024g", "2024a"));
    }

    #[test]
    fn multi_digit_components_order() {
        assert!(remote_is_newer("1.2.9", "1.2.10"));
        assert!(remote_is_newer("1.9", "1.10"));
    }
}
