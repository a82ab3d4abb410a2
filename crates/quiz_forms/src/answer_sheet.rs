//! Answer sheet on the quiz take page: every question needs a selected
//! choice before the attempt can be submitted.

use serde::{Deserialize, Serialize};
use shared::domain::{CorrectOption, QuestionId};
use tracing::{debug, info};

use crate::error::AnswerSheetError;

/// Fixed header height the scroll target is offset by.
pub const HEADER_OFFSET_PX: u32 = 100;
pub const PULSE_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SheetAction {
    Answer {
        question: QuestionId,
        choice: CorrectOption,
    },
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SheetUpdate {
    Highlight { question: QuestionId },
    ClearHighlight { question: QuestionId },
    ShowAlert { message: String },
    RemoveAlert,
    ScrollTo { question: QuestionId, offset_px: u32 },
    Pulse { question: QuestionId, duration_ms: u64 },
    AllowSubmit,
    BlockSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetQuestion {
    id: QuestionId,
    selected: Option<CorrectOption>,
    highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    questions: Vec<SheetQuestion>,
    alert_visible: bool,
}

impl AnswerSheet {
    pub fn new(questions: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            questions: questions
                .into_iter()
                .map(|id| SheetQuestion {
                    id,
                    selected: None,
                    highlighted: false,
                })
                .collect(),
            alert_visible: false,
        }
    }

    pub fn apply(&mut self, action: SheetAction) -> Result<Vec<SheetUpdate>, AnswerSheetError> {
        match action {
            SheetAction::Answer { question, choice } => self.answer(question, choice),
            SheetAction::Submit => Ok(self.submit()),
        }
    }

    pub fn selected(&self, question: QuestionId) -> Option<CorrectOption> {
        self.questions
            .iter()
            .find(|q| q.id == question)
            .and_then(|q| q.selected)
    }

    pub fn is_highlighted(&self, question: QuestionId) -> bool {
        self.questions
            .iter()
            .any(|q| q.id == question && q.highlighted)
    }

    pub fn alert_visible(&self) -> bool {
        self.alert_visible
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.selected.is_none()).count()
    }

    pub fn answer(
        &mut self,
        question: QuestionId,
        choice: CorrectOption,
    ) -> Result<Vec<SheetUpdate>, AnswerSheetError> {
        let entry = self
            .questions
            .iter_mut()
            .find(|q| q.id == question)
            .ok_or(AnswerSheetError::UnknownQuestion(question))?;
        entry.selected = Some(choice);

        let mut updates = Vec::new();
        if entry.highlighted {
            entry.highlighted = false;
            updates.push(SheetUpdate::ClearHighlight { question });
        }
        if self.alert_visible && !self.questions.iter().any(|q| q.highlighted) {
            self.alert_visible = false;
            updates.push(SheetUpdate::RemoveAlert);
        }
        Ok(updates)
    }

    pub fn submit(&mut self) -> Vec<SheetUpdate> {
        let mut updates = Vec::new();
        for question in &mut self.questions {
            if question.highlighted {
                question.highlighted = false;
                updates.push(SheetUpdate::ClearHighlight {
                    question: question.id,
                });
            }
        }

        let mut first_unanswered = None;
        for question in self.questions.iter_mut().filter(|q| q.selected.is_none()) {
            question.highlighted = true;
            if first_unanswered.is_none() {
                first_unanswered = Some(question.id);
            }
            updates.push(SheetUpdate::Highlight {
                question: question.id,
            });
        }

        let Some(first) = first_unanswered else {
            debug!(questions = self.questions.len(), "answer sheet complete");
            updates.push(SheetUpdate::AllowSubmit);
            return updates;
        };

        let unanswered = self.unanswered_count();
        info!(unanswered, "attempt submit blocked by unanswered questions");
        // A fresh alert replaces any previous one.
        if self.alert_visible {
            updates.push(SheetUpdate::RemoveAlert);
        }
        self.alert_visible = true;
        updates.push(SheetUpdate::ShowAlert {
            message: unanswered_message(unanswered),
        });
        updates.push(SheetUpdate::ScrollTo {
            question: first,
            offset_px: HEADER_OFFSET_PX,
        });
        updates.push(SheetUpdate::Pulse {
            question: first,
            duration_ms: PULSE_MS,
        });
        updates.push(SheetUpdate::BlockSubmit);
        updates
    }
}

pub fn unanswered_message(count: usize) -> String {
    if count == 1 {
        "Please answer the highlighted question before submitting.".to_string()
    } else {
        format!("Please answer all {count} highlighted questions before submitting.")
    }
}
