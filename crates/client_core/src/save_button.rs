//! State of the "Save Quiz" button on the results page.

use shared::{
    domain::QuizId,
    notice::Notice,
    protocol::{login_redirect_path, SaveToggleResponse},
};
use tracing::warn;

use crate::{error::ErrorCategory, ClientError, QuizClient};

pub const SAVED_LABEL: &str = "Saved";
pub const UNSAVED_LABEL: &str = "Save Quiz";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save quiz. Please try again.";
pub const SAVE_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFeedback {
    Updated { saved: bool, notice: Notice },
    /// Send the browser to the login page, returning here afterwards.
    Redirect(String),
    Failed(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveButton {
    quiz_id: QuizId,
    saved: bool,
}

impl SaveButton {
    pub fn new(quiz_id: QuizId, saved: bool) -> Self {
        Self { quiz_id, saved }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn label(&self) -> &'static str {
        if self.saved {
            SAVED_LABEL
        } else {
            UNSAVED_LABEL
        }
    }

    pub fn icon_class(&self) -> &'static str {
        if self.saved {
            "fas fa-bookmark"
        } else {
            "far fa-bookmark"
        }
    }

    pub fn on_response(&mut self, response: SaveToggleResponse) -> SaveFeedback {
        self.saved = response.saved;
        SaveFeedback::Updated {
            saved: self.saved,
            notice: Notice::success(response.message),
        }
    }

    /// State is left untouched on failure.
    pub fn on_failure(&self, err: &ClientError, current_path: &str) -> SaveFeedback {
        warn!(quiz_id = self.quiz_id.0, error = %err, "quiz save toggle failed");
        match err.category() {
            ErrorCategory::Auth => SaveFeedback::Redirect(login_redirect_path(current_path)),
            ErrorCategory::Http => SaveFeedback::Failed(Notice::error(SAVE_FAILED_MESSAGE)),
            ErrorCategory::Transport => SaveFeedback::Failed(Notice::error(SAVE_ERROR_MESSAGE)),
        }
    }

    pub async fn toggle(&mut self, client: &QuizClient, current_path: &str) -> SaveFeedback {
        match client.toggle_save(self.quiz_id).await {
            Ok(response) => self.on_response(response),
            Err(err) => self.on_failure(&err, current_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::{
        error::{ApiException, ErrorCode},
        notice::NoticeLevel,
    };

    use super::*;

    #[test]
    fn response_flips_label_and_icon() {
        let mut button = SaveButton::new(QuizId(3), false);
        assert_eq!(button.label(), UNSAVED_LABEL);

        let feedback = button.on_response(SaveToggleResponse {
            success: true,
            saved: true,
            message: "\"Rust\" saved to your profile!".into(),
        });
        assert_eq!(button.label(), SAVED_LABEL);
        assert_eq!(button.icon_class(), "fas fa-bookmark");
        match feedback {
            SaveFeedback::Updated { saved, notice } => {
                assert!(saved);
                assert_eq!(notice.level, NoticeLevel::Success);
            }
            other => panic!("unexpected feedback: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_redirects_to_login_with_next() {
        let button = SaveButton::new(QuizId(3), true);
        let err = ClientError::from(ApiException::new(ErrorCode::Unauthorized, "login"));
        assert_eq!(
            button.on_failure(&err, "/quizzes/rust/results/"),
            SaveFeedback::Redirect("/accounts/login/?next=/quizzes/rust/results/".into())
        );
        assert!(button.is_saved());
    }

    #[test]
    fn server_error_keeps_state_and_reports_retry_message() {
        let button = SaveButton::new(QuizId(3), false);
        let err = ClientError::from(ApiException::new(ErrorCode::Internal, "boom"));
        assert_eq!(
            button.on_failure(&err, "/"),
            SaveFeedback::Failed(Notice::error(SAVE_FAILED_MESSAGE))
        );
        assert!(!button.is_saved());
    }
}
