//! The flat event record captured from the submission form.

use serde::{Deserialize, Serialize};

use crate::paths::sanitize_filename;

/// One generation request's worth of form fields. Everything is a plain
/// string; blank optional fields render as empty sections downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    pub ref_no: String,
    pub date_ref: String,
    pub title: String,
    pub department: String,
    pub academic_year: String,
    pub date_activity: String,
    pub organized_by: String,
    pub overview: String,
    pub day1: String,
    pub day2: String,
    pub learning_outcomes: String,
    pub conclusion: String,
    pub circular_text: String,
}

impl EventRecord {
    /// Output file stem derived from the title: spaces become underscores,
    /// the rest is sanitized, and a blank title falls back to `event`.
    pub fn base_name(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            return "event".to_string();
        }
        sanitize_filename(&title.replace(' ', "_"))
    }

    /// Assign a form field by its submitted name. Unknown names are ignored
    /// so the form can evolve without breaking older pages.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "ref_no" => self.ref_no = value,
            "date_ref" => self.date_ref = value,
            "title" => self.title = value,
            "department" => self.department = value,
            "academic_year" => self.academic_year = value,
            "date_activity" => self.date_activity = value,
            "organized_by" => self.organized_by = value,
            "overview" => self.overview = value,
            "day1" => self.day1 = value,
            "day2" => self.day2 = value,
            "learning_outcomes" => self.learning_outcomes = value,
            "conclusion" => self.conclusion = value,
            "circular_text" => self.circular_text = value,
            _ => {}
        }
    }
}
