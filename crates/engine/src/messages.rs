// Fixed texts for results the engine synthesizes without a backend call,
// plus the labels used when a report is shown to a person.

use docdiff_core::{ChangeAction, ChangeType, Language, SheetStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub exact_match: &'static str,
    pub sheet_added: &'static str,
    pub sheet_removed: &'static str,
    pub sheet_added_desc: &'static str,
    pub sheet_removed_desc: &'static str,
    pub unknown_error: &'static str,
    pub summary: &'static str,
    /// Includes its trailing colon
    pub error_prefix: &'static str,
    /// PENDING, PROCESSING, COMPLETED, ERROR, SKIPPED
    statuses: [&'static str; 5],
    /// TABLE, COLUMN, INDEX, TRIGGER, CONSTRAINT, OTHER
    types: [&'static str; 6],
    /// ADDED, REMOVED, MODIFIED
    actions: [&'static str; 3],
}

impl Messages {
    pub fn status_label(&self, status: SheetStatus) -> &'static str {
        let idx = match status {
            SheetStatus::Pending => 0,
            SheetStatus::Processing => 1,
            SheetStatus::Completed => 2,
            SheetStatus::Error => 3,
            SheetStatus::Skipped => 4,
        };
        self.statuses[idx]
    }

    pub fn type_label(&self, change_type: ChangeType) -> &'static str {
        let idx = match change_type {
            ChangeType::Table => 0,
            ChangeType::Column => 1,
            ChangeType::Index => 2,
            ChangeType::Trigger => 3,
            ChangeType::Constraint => 4,
            ChangeType::Other => 5,
        };
        self.types[idx]
    }

    pub fn action_label(&self, action: ChangeAction) -> &'static str {
        let idx = match action {
            ChangeAction::Added => 0,
            ChangeAction::Removed => 1,
            ChangeAction::Modified => 2,
        };
        self.actions[idx]
    }
}

const EN: Messages = Messages {
    exact_match: "No changes detected (Exact match).",
    sheet_added: "Entire sheet added.",
    sheet_removed: "Entire sheet removed.",
    sheet_added_desc: "New sheet added to the specification",
    sheet_removed_desc: "Sheet removed from the specification",
    unknown_error: "Unknown error",
    summary: "Summary",
    error_prefix: "Error:",
    statuses: ["pending", "processing", "completed", "error", "skipped"],
    types: ["Table", "Column", "Index", "Trigger", "Constraint", "Other"],
    actions: ["Added", "Removed", "Modified"],
};

const JA: Messages = Messages {
    exact_match: "変更なし（完全一致）",
    sheet_added: "シート追加",
    sheet_removed: "シート削除",
    sheet_added_desc: "仕様書に新しいシートが追加されました",
    sheet_removed_desc: "仕様書からシートが削除されました",
    unknown_error: "不明なエラー",
    summary: "サマリー",
    error_prefix: "エラー:",
    statuses: ["待機中", "処理中", "完了", "エラー", "スキップ"],
    types: ["テーブル", "カラム", "インデックス", "トリガー", "制約", "その他"],
    actions: ["追加", "削除", "変更"],
};

const FR: Messages = Messages {
    exact_match: "Aucun changement détecté (Correspondance exacte).",
    sheet_added: "Feuille entière ajoutée.",
    sheet_removed: "Feuille entière supprimée.",
    sheet_added_desc: "Nouvelle feuille ajoutée à la spécification",
    sheet_removed_desc: "Feuille supprimée de la spécification",
    unknown_error: "Erreur inconnue",
    summary: "Résumé",
    error_prefix: "Erreur:",
    statuses: ["en attente", "traitement", "terminé", "erreur", "ignoré"],
    types: ["Table", "Colonne", "Index", "Déclencheur", "Contrainte", "Autre"],
    actions: ["Ajouté", "Supprimé", "Modifié"],
};

pub fn messages(language: Language) -> &'static Messages {
    match language {
        Language::En => &EN,
        Language::Ja => &JA,
        Language::Fr => &FR,
    }
}
