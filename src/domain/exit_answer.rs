use serde::{Deserialize, Serialize};

use unicode_segmentation::UnicodeSegmentation;

/// Upper bound on the number of answers in one questionnaire submission
pub const MAX_ANSWERS: usize = 50;

const MAX_QUESTION_LEN: usize = 500;
const MAX_RESPONSE_LEN: usize = 5000;

/// One answered question of the exit questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitAnswer {
    pub question_text: String,
    pub response: String,
}

impl ExitAnswer {
    /// Check a single answer for blank or oversized fields
    pub fn validate(&self) -> Result<(), String> {
        check_text("Question text", &self.question_text, MAX_QUESTION_LEN)?;
        check_text("Response", &self.response, MAX_RESPONSE_LEN)
    }

    /// Check a whole submission. Order is preserved as given
    pub fn validate_all(answers: &[ExitAnswer]) -> Result<(), String> {
        if answers.is_empty() {
            return Err("Responses cannot be empty".into());
        }
        if answers.len() > MAX_ANSWERS {
            return Err(format!("At most {} responses are accepted", MAX_ANSWERS));
        }
        answers.iter().try_for_each(ExitAnswer::validate)
    }
}

fn check_text(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if value.graphemes(true).count() > max_len {
        return Err(format!("{} too long", field));
    }
    Ok(())
}
