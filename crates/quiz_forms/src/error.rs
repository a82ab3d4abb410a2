use shared::{domain::QuestionId, notice::Notice};
use thiserror::Error;

use crate::formset::AT_LEAST_ONE_MESSAGE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormsetError {
    #[error("removing slot {index} would leave no active question")]
    LastActiveSlot { index: usize },
    #[error("no question slot at index {index}")]
    UnknownSlot { index: usize },
    #[error("question slot {index} is already marked for deletion")]
    AlreadyDeleted { index: usize },
    #[error("question slot {index} has no field named '{field}'")]
    UnknownField { index: usize, field: String },
    #[error("template fields are named with prefix '{template}' but the formset posts '{formset}'")]
    PrefixMismatch { formset: String, template: String },
}

impl FormsetError {
    /// Notice shown to the user when the refusal is something they caused.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::LastActiveSlot { .. } => Some(Notice::warning(AT_LEAST_ONE_MESSAGE)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template markup does not contain the index placeholder '{placeholder}'")]
    MissingIndexPlaceholder { placeholder: &'static str },
    #[error("template declares no fields")]
    NoFields,
    #[error("template declares field '{0}' more than once")]
    DuplicateField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerSheetError {
    #[error("question {0} is not on this answer sheet")]
    UnknownQuestion(QuestionId),
}
