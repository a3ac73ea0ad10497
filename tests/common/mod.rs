//! Shared fixtures for the end-to-end sync tests.

use relmirror::Config;
use serde_json::{json, Value};

/// Configuration pointing at the mock servers' repositories.
pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "gitee_owner" => "mirror-org",
            "gitee_repo" => "tool",
            "gitee_token" => "test-token-123456",
            "github_owner" => "upstream",
            "github_repo" => "tool",
            _ => return None,
        };
        Some(value.to_owned())
    })
    .expect("test configuration is complete")
}

/// A source-side release payload as the listing and detail endpoints
/// return it.
pub fn source_release(tag: &str, id: u64, body: &str, assets: Vec<Value>) -> Value {
    json!({
        "tag_name": tag,
        "id": id,
        "name": tag,
        "body": body,
        "target_commitish": "master",
        "assets": assets,
    })
}

/// A destination-side release payload with assets already mirrored.
pub fn dest_release(tag: &str, id: u64, asset_names: &[&str]) -> Value {
    let assets: Vec<Value> = asset_names
        .iter()
        .map(|name| json!({"name": name, "browser_download_url": format!("https://mirror/{name}")}))
        .collect();
    json!({
        "tag_name": tag,
        "id": id,
        "name": tag,
        "body": "-",
        "assets": assets,
    })
}

pub fn asset(name: &str, download_url: &str) -> Value {
    json!({"name": name, "browser_download_url": download_url})
}
