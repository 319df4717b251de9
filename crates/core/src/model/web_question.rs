use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::question::Difficulty;

/// A curated community question shipped with the app and cached locally.
///
/// Read-only once built. Optional-on-read defaults: `difficulty` is
/// `medium`, `tags` is empty, `solution`, `codeSnippet` and `upvotes` are
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebQuestion {
    pub id: String,
    pub title: String,
    pub question: String,
    /// Source name or link.
    pub source: String,
    /// e.g. `"reddit"`, `"stackoverflow"`, `"swift-forums"`.
    pub source_type: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub code_snippet: Option<String>,
    pub fetched_date: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: Option<u32>,
}

impl WebQuestion {
    /// The source as a link, when it is one.
    #[must_use]
    pub fn source_url(&self) -> Option<Url> {
        Url::parse(&self.source)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
