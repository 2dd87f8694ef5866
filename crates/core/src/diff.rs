use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of database object a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Table,
    Column,
    Index,
    Trigger,
    Constraint,
    Other,
}

impl ChangeType {
    pub const ALL: [ChangeType; 6] = [
        ChangeType::Table,
        ChangeType::Column,
        ChangeType::Index,
        ChangeType::Trigger,
        ChangeType::Constraint,
        ChangeType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Table => "TABLE",
            ChangeType::Column => "COLUMN",
            ChangeType::Index => "INDEX",
            ChangeType::Trigger => "TRIGGER",
            ChangeType::Constraint => "CONSTRAINT",
            ChangeType::Other => "OTHER",
        }
    }

    /// Case-insensitive lookup by wire name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nature of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Added,
    Removed,
    Modified,
}

impl ChangeAction {
    pub const ALL: [ChangeAction; 3] = [ChangeAction::Added, ChangeAction::Removed, ChangeAction::Modified];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Added => "ADDED",
            ChangeAction::Removed => "REMOVED",
            ChangeAction::Modified => "MODIFIED",
        }
    }

    /// Case-insensitive lookup by wire name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic change reported for a sheet.
///
/// Produced by a reasoning backend, or synthesized locally for whole-sheet
/// additions and removals. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffItem {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub action: ChangeAction,
    /// Name of the affected object (table, column, index, ...)
    pub target: String,
    /// Human-readable description, in the run's language
    pub description: String,
    #[serde(rename = "oldValue", default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(rename = "newValue", default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl DiffItem {
    pub fn new(
        change_type: ChangeType,
        action: ChangeAction,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            action,
            target: target.into(),
            description: description.into(),
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_values(mut self, old_value: Option<String>, new_value: Option<String>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }
}

/// Result of comparing one pair of sheets through a backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffPayload {
    pub diffs: Vec<DiffItem>,
    pub summary: String,
}

impl DiffPayload {
    /// A payload with no changes and a fixed summary.
    pub fn empty(summary: impl Into<String>) -> Self {
        Self {
            diffs: Vec::new(),
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_parse_is_case_insensitive() {
        assert_eq!(ChangeType::parse("column"), Some(ChangeType::Column));
        assert_eq!(ChangeType::parse(" INDEX "), Some(ChangeType::Index));
        assert_eq!(ChangeType::parse("view"), None);
    }

    #[test]
    fn test_change_action_parse() {
        assert_eq!(ChangeAction::parse("Modified"), Some(ChangeAction::Modified));
        assert_eq!(ChangeAction::parse("renamed"), None);
    }

    #[test]
    fn test_diff_item_wire_names() {
        let item = DiffItem::new(ChangeType::Column, ChangeAction::Modified, "users.email", "Length increased")
            .with_values(Some("VARCHAR(50)".into()), Some("VARCHAR(100)".into()));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "COLUMN");
        assert_eq!(json["action"], "MODIFIED");
        assert_eq!(json["oldValue"], "VARCHAR(50)");
        assert_eq!(json["newValue"], "VARCHAR(100)");
    }

    #[test]
    fn test_diff_item_omits_absent_values() {
        let item = DiffItem::new(ChangeType::Table, ChangeAction::Added, "orders", "New table");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("oldValue").is_none());
        assert!(json.get("newValue").is_none());
    }
}
