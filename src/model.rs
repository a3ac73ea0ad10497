//! Typed snapshots of remote release catalogs.
//!
//! Both platforms serve structurally compatible release JSON, so one record
//! type covers source and destination. Records are read-only snapshots taken
//! at the start of a pass; they are never mutated in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One release as reported by a remote catalog.
///
/// Identity is `tag_name`: two records from different platforms represent
/// the same release iff their tags are byte-for-byte equal. A record without
/// a tag is excluded from reconciliation entirely.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReleaseRecord {
    pub tag_name: Option<String>,
    /// Opaque identifier assigned by the remote on creation.
    pub id: Option<u64>,
    pub name: Option<String>,
    pub body: Option<String>,
    pub target_commitish: Option<String>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

/// One file attached to a release. Identity is `name` within the release's
/// asset set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetRecord {
    pub name: String,
    /// Absent for metadata-only assets; such assets are never transferred.
    pub browser_download_url: Option<String>,
    pub id: Option<u64>,
}

impl ReleaseRecord {
    /// Index this release's assets by filename for membership tests.
    pub fn asset_index(&self) -> HashMap<&str, &AssetRecord> {
        self.assets
            .iter()
            .map(|asset| (asset.name.as_str(), asset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_release_with_assets() {
        let json = r#"{
            "tag_name": "v1.2.0",
            "id": 101,
            "name": "v1.2.0",
            "body": "notes",
            "target_commitish": "main",
            "assets": [
                {"name": "a.bin", "browser_download_url": "https://host/a.bin", "id": 9},
                {"name": "meta.txt", "browser_download_url": null}
            ]
        }"#;

        let release: ReleaseRecord = serde_json::from_str(json).expect("valid release JSON");
        assert_eq!(release.tag_name.as_deref(), Some("v1.2.0"));
        assert_eq!(release.id, Some(101));
        assert_eq!(release.assets.len(), 2);
        assert_eq!(
            release.assets[0].browser_download_url.as_deref(),
            Some("https://host/a.bin")
        );
        assert!(release.assets[1].browser_download_url.is_none());
    }

    #[test]
    fn test_deserialize_release_without_tag() {
        // Defensive: a catalog entry missing tag_name still parses and is
        // skipped later by the reconciler.
        let release: ReleaseRecord =
            serde_json::from_str(r#"{"id": 5, "name": "draft"}"#).expect("valid JSON");
        assert!(release.tag_name.is_none());
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_asset_index_keys_by_filename() {
        let release: ReleaseRecord = serde_json::from_str(
            r#"{"tag_name": "v1", "assets": [{"name": "x.tar.gz"}, {"name": "y.zip"}]}"#,
        )
        .expect("valid JSON");

        let index = release.asset_index();
        assert!(index.contains_key("x.tar.gz"));
        assert!(index.contains_key("y.zip"));
        assert!(!index.contains_key("z.deb"));
    }
}
