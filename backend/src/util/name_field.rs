use serde::Serialize;

use super::similarity::find_duplicate_match;

/// Duplicate-warning state of a "new event name" input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FieldState {
    Empty,
    Clean,
    Warning { matched: String, similarity: f64 },
}

/// Tracks the typed name and re-runs the duplicate check on every change.
///
/// A warning never blocks submission.
#[derive(Debug, Clone)]
pub struct NameField {
    value: String,
    state: FieldState,
}

impl Default for NameField {
    fn default() -> Self {
        Self {
            value: String::new(),
            state: FieldState::Empty,
        }
    }
}

impl NameField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn update<S: AsRef<str>>(&mut self, value: &str, pool: &[S]) -> &FieldState {
        self.value = value.to_string();
        self.state = evaluate(value, pool);
        &self.state
    }

    pub fn can_submit(&self) -> bool {
        !self.value.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stateless form of [`NameField::update`]; the untrimmed value is matched.
pub fn evaluate<S: AsRef<str>>(value: &str, pool: &[S]) -> FieldState {
    if value.trim().is_empty() {
        return FieldState::Empty;
    }

    match find_duplicate_match(value, pool) {
        Some(hit) => FieldState::Warning {
            matched: hit.name.to_string(),
            similarity: hit.score,
        },
        None => FieldState::Clean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: [&str; 3] = ["Tech Expo 2025", "Food Carnival", "Music Fest"];

    #[test]
    fn blank_input_is_empty() {
        let mut field = NameField::new();
        assert_eq!(field.update("", &POOL), &FieldState::Empty);
        assert_eq!(field.update("   \t", &POOL), &FieldState::Empty);
        assert!(!field.can_submit());
    }

    #[test]
    fn typing_moves_between_clean_and_warning() {
        let mut field = NameField::new();
        assert_eq!(field.update("M", &POOL), &FieldState::Clean);
        assert_eq!(field.update("Music Fes", &POOL), &FieldState::Warning {
            matched: "Music Fest".to_string(),
            similarity: 90.0,
        });
        assert_eq!(field.update("Music Festival 2026", &POOL), &FieldState::Clean);
        assert_eq!(field.update("", &POOL), &FieldState::Empty);
    }

    #[test]
    fn warning_does_not_block_submit() {
        let mut field = NameField::new();
        field.update("tech expo 2025", &POOL);
        assert!(matches!(field.state(), FieldState::Warning { .. }));
        assert!(field.can_submit());
    }

    #[test]
    fn surrounding_whitespace_counts_as_edits() {
        // "  Music Fest  " is 14 chars with 4 extra spaces
        assert_eq!(evaluate("  Music Fest  ", &POOL), FieldState::Clean);
    }

    #[test]
    fn reset_clears_value_and_state() {
        let mut field = NameField::new();
        field.update("Food Carnival", &POOL);
        field.reset();
        assert_eq!(field.value(), "");
        assert_eq!(field.state(), &FieldState::Empty);
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(FieldState::Warning {
            matched: "Music Fest".to_string(),
            similarity: 90.0,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "warning", "matched": "Music Fest", "similarity": 90.0})
        );
        let json = serde_json::to_value(FieldState::Clean).unwrap();
        assert_eq!(json, serde_json::json!({"state": "clean"}));
    }
}
