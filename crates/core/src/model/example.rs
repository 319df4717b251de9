use serde::{Deserialize, Serialize};

use crate::model::ids::{ExampleId, TopicId};

fn default_language() -> String {
    "swift".to_owned()
}

/// A note attached to one line of an example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnnotation {
    pub id: String,
    pub line_number: u32,
    pub text: String,
    pub highlight: bool,
}

/// A code listing tied to a topic.
///
/// Migration examples carry `before_code`/`after_code` for a side-by-side
/// comparison. Optional-on-read defaults: `language` is `"swift"`,
/// `annotations` is empty, `isMigrationExample` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExample {
    pub id: ExampleId,
    pub title: String,
    pub description: String,
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub before_code: Option<String>,
    #[serde(default)]
    pub after_code: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CodeAnnotation>,
    pub related_topic_id: TopicId,
    #[serde(default)]
    pub is_migration_example: bool,
}

impl CodeExample {
    /// Code to show for this example.
    ///
    /// Non-migration examples always show `code`. Migration examples show
    /// the before or after body, falling back to `code` when that body is
    /// missing.
    #[must_use]
    pub fn display_code(&self, show_before: bool) -> &str {
        if !self.is_migration_example {
            return &self.code;
        }
        let body = if show_before {
            self.before_code.as_deref()
        } else {
            self.after_code.as_deref()
        };
        body.unwrap_or(&self.code)
    }

    /// Annotations flagged for highlighting, in listing order.
    pub fn highlighted_lines(&self) -> impl Iterator<Item = &CodeAnnotation> {
        self.annotations.iter().filter(|a| a.highlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(migration: bool, before: Option<&str>, after: Option<&str>) -> CodeExample {
        CodeExample {
            id: ExampleId::new("ex"),
            title: "Example".into(),
            description: String::new(),
            code: "primary".into(),
            language: default_language(),
            before_code: before.map(str::to_owned),
            after_code: after.map(str::to_owned),
            annotations: Vec::new(),
            related_topic_id: TopicId::new("t"),
            is_migration_example: migration,
        }
    }

    #[test]
    fn migration_example_switches_bodies() {
        let ex = example(true, Some("old"), Some("new"));
        assert_eq!(ex.display_code(true), "old");
        assert_eq!(ex.display_code(false), "new");
    }

    #[test]
    fn missing_after_falls_back_to_primary() {
        let ex = example(true, Some("old"), None);
        assert_eq!(ex.display_code(false), "primary");
    }

    #[test]
    fn non_migration_ignores_toggle() {
        let ex = example(false, Some("old"), Some("new"));
        assert_eq!(ex.display_code(true), "primary");
        assert_eq!(ex.display_code(false), "primary");
    }

    #[test]
    fn decodes_with_defaults() {
        let ex: CodeExample = serde_json::from_str(
            r#"{
                "id": "ex-1",
                "title": "Weak capture",
                "description": "Avoid cycles",
                "code": "{ [weak self] in }",
                "annotations": [
                    { "id": "a1", "lineNumber": 1, "text": "weak", "highlight": true },
                    { "id": "a2", "lineNumber": 2, "text": "plain", "highlight": false }
                ],
                "relatedTopicId": "closures"
            }"#,
        )
        .unwrap();
        assert_eq!(ex.language, "swift");
        assert!(!ex.is_migration_example);
        assert_eq!(ex.highlighted_lines().count(), 1);
    }
}
