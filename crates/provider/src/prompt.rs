// Prompt construction shared by every backend

use docdiff_core::Language;

/// Each sheet body is cut to this many characters before it is sent.
pub const MAX_CSV_CHARS: usize = 20_000;

/// Output contract spelled out for backends that cannot enforce a schema.
pub const TEXTUAL_SCHEMA: &str = r#"{
  "diffs": [
    {
      "type": "TABLE" | "COLUMN" | "INDEX" | "TRIGGER" | "CONSTRAINT" | "OTHER",
      "action": "ADDED" | "REMOVED" | "MODIFIED",
      "target": "string (name of object)",
      "description": "string (concise summary)",
      "oldValue": "string (optional)",
      "newValue": "string (optional)"
    }
  ],
  "summary": "string (executive summary)"
}"#;

/// System instruction. Fixed for a run since only the language varies.
pub fn system_prompt(language: Language) -> String {
    format!(
        "You are a Senior Database Architect and an expert in analyzing Database Definition Documents (Excel/CSV format).\n\
         You are a precise and technical Database Doc Diff tool.\n\
         Output must be in pure JSON format.\n\
         Provide the 'description' field and the 'summary' field in {}.",
        language.display_name()
    )
}

/// User instruction for one sheet pair.
pub fn user_prompt(sheet_name: &str, old_csv: &str, new_csv: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Task: Compare the \"Old Version\" and \"New Version\" of the database definition sheet named \"{}\".\n\n",
        sheet_name
    ));
    prompt.push_str(
        "Instructions:\n\
         1. Identify semantic changes related to RDB structures: Tables, Columns, Data Types, Lengths, Nullability, Primary Keys, Foreign Keys, Indexes, Triggers, and Comments/Descriptions.\n\
         2. Ignore purely cosmetic changes like cell formatting, empty rows, or minor whitespace differences unless they change the meaning.\n\
         3. Pay special attention to:\n   \
            - Column Type changes (e.g., VARCHAR(50) -> VARCHAR(100), INT -> BIGINT).\n   \
            - Nullability changes (NULL -> NOT NULL).\n   \
            - New or removed columns.\n   \
            - Index definition changes.\n\
         4. Return the result as a structured JSON object.\n\n",
    );

    prompt.push_str("Old Version (CSV):\n```csv\n");
    prompt.push_str(truncate_chars(old_csv, MAX_CSV_CHARS));
    prompt.push_str("\n```\n\n");

    prompt.push_str("New Version (CSV):\n```csv\n");
    prompt.push_str(truncate_chars(new_csv, MAX_CSV_CHARS));
    prompt.push_str("\n```\n\n");

    prompt.push_str("JSON Schema for output:\n");
    prompt.push_str(TEXTUAL_SCHEMA);

    prompt
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
