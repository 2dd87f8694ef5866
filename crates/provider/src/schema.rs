// Structured-output schema for backends that enforce one

use docdiff_core::{ChangeAction, ChangeType};
use serde_json::{json, Value};

/// Response schema in the OpenAPI subset accepted by `generateContent`.
pub fn response_schema() -> Value {
    let types: Vec<&str> = ChangeType::ALL.iter().map(|t| t.as_str()).collect();
    let actions: Vec<&str> = ChangeAction::ALL.iter().map(|a| a.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "diffs": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {
                            "type": "STRING",
                            "enum": types,
                            "description": "The type of database object that changed."
                        },
                        "action": {
                            "type": "STRING",
                            "enum": actions,
                            "description": "The nature of the change."
                        },
                        "target": {
                            "type": "STRING",
                            "description": "The name of the object (e.g., 'Users table', 'email column')."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "A concise summary of what changed (e.g., 'Length increased from 50 to 100')."
                        },
                        "oldValue": {
                            "type": "STRING",
                            "description": "The value in the old version (if applicable)."
                        },
                        "newValue": {
                            "type": "STRING",
                            "description": "The value in the new version (if applicable)."
                        }
                    },
                    "required": ["type", "action", "target", "description"]
                }
            },
            "summary": {
                "type": "STRING",
                "description": "A very brief executive summary of changes in this sheet."
            }
        },
        "required": ["diffs", "summary"]
    })
}
