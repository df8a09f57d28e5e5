//! Cache key fingerprints.
//!
//! Every builder canonicalizes its input first, so semantically equal
//! requests map to the same key regardless of field order or omitted
//! defaults.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::directory::SearchQuery;

/// Temperature assumed when a completion request omits it.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Token budget assumed when a completion request omits it.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A text completion request, as far as caching is concerned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Any other sampling parameters.
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

/// Fingerprint of a completion request.
///
/// Explicit fields win over the same key in `params`; missing temperature
/// and max_tokens take the defaults above.
pub fn completion_fingerprint(request: &CompletionRequest) -> String {
    let mut canonical: BTreeMap<String, Value> = request
        .params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let temperature = request
        .temperature
        .or_else(|| canonical.get("temperature").and_then(Value::as_f64))
        .unwrap_or(DEFAULT_TEMPERATURE);
    let max_tokens = request
        .max_tokens
        .map(u64::from)
        .or_else(|| canonical.get("max_tokens").and_then(Value::as_u64))
        .unwrap_or(DEFAULT_MAX_TOKENS as u64);

    // 0.7 and 0.70000001 are the same request.
    let temperature = (temperature * 10_000.0).round() / 10_000.0;

    canonical.insert("temperature".to_string(), Value::from(temperature));
    canonical.insert("max_tokens".to_string(), Value::from(max_tokens));
    canonical.insert("model".to_string(), Value::from(request.model.trim()));
    canonical.insert("prompt".to_string(), Value::from(request.prompt.as_str()));
    if let Some(system) = &request.system {
        canonical.insert("system".to_string(), Value::from(system.as_str()));
    }

    format!("completion:{}", digest(&canonical))
}

/// Fingerprint of one analysis of one podcast.
///
/// Bumping `version` yields new keys, so stale analyses are never read back.
pub fn analysis_fingerprint(podcast_id: &str, kind: &str, version: &str) -> String {
    format!("analysis:{}:{}:{}", kind, version, podcast_id)
}

/// Fingerprint of a directory search page.
pub fn search_fingerprint(query: &SearchQuery) -> String {
    let mut genres = query.paging.genre_ids.clone();
    genres.sort_unstable();
    genres.dedup();

    let normalized_query = query
        .query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut canonical: BTreeMap<String, Value> = BTreeMap::new();
    canonical.insert("query".to_string(), Value::from(normalized_query));
    canonical.insert("offset".to_string(), Value::from(query.paging.offset));
    canonical.insert("page_size".to_string(), Value::from(query.paging.page_size));
    canonical.insert("sort_by_date".to_string(), Value::from(query.paging.sort_by_date));
    canonical.insert(
        "language".to_string(),
        Value::from(query.paging.language.as_deref().map(str::to_lowercase)),
    );
    canonical.insert("genre_ids".to_string(), Value::from(genres));

    format!("search:{}", digest(&canonical))
}

fn digest(canonical: &BTreeMap<String, Value>) -> String {
    // BTreeMap keys serialize sorted; nested objects are sorted maps as well.
    let json = Value::Object(canonical.clone().into_iter().collect()).to_string();
    format!("{:x}", Sha256::digest(json.as_bytes()))
}
