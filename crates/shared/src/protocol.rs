use serde::{Deserialize, Serialize};

use crate::domain::QuizId;

/// Body returned by `POST /accounts/quiz/{quiz_id}/save/` for AJAX callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveToggleResponse {
    #[serde(default)]
    pub success: bool,
    pub saved: bool,
    #[serde(default)]
    pub message: String,
}

pub fn save_toggle_path(quiz_id: QuizId) -> String {
    format!("/accounts/quiz/{}/save/", quiz_id.0)
}

pub fn login_redirect_path(next: &str) -> String {
    let next = if next.is_empty() { "/" } else { next };
    format!("/accounts/login/?next={next}")
}
