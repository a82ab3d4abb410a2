//! Double-submit guard for the quiz generator form on the home page.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardUpdate {
    /// Topic is blank; the field's own required-validation message applies.
    ReportMissingTopic,
    ShowLoading,
    /// Disable visible text inputs and buttons. Hidden inputs such as the
    /// CSRF token stay enabled so they are still posted.
    DisableControls,
    AllowSubmit,
    BlockSubmit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitGuard {
    submitting: bool,
}

impl SubmitGuard {
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit(&mut self, topic: &str) -> Vec<GuardUpdate> {
        if self.submitting {
            debug!("duplicate generator submit ignored");
            return vec![GuardUpdate::BlockSubmit];
        }
        if topic.trim().is_empty() {
            return vec![GuardUpdate::ReportMissingTopic, GuardUpdate::BlockSubmit];
        }

        self.submitting = true;
        debug!(topic = topic.trim(), "generator submit started");
        vec![
            GuardUpdate::ShowLoading,
            GuardUpdate::AllowSubmit,
            GuardUpdate::DisableControls,
        ]
    }
}
