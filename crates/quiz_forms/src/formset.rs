//! Formset manager: the ordered collection of question slots on the quiz
//! create/edit page.
//!
//! Absolute indices are always `0..total_count()`. Persisted slots occupy the
//! leading indices and are only ever flagged for deletion; slots added on this
//! page follow them and are dropped outright when removed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared::{domain::QuestionId, notice::Notice};
use tracing::{debug, info, warn};

use crate::{
    error::FormsetError,
    submission::{self, Submission},
    template::Template,
    view::{FormsetAction, ViewUpdate},
};

pub const DEFAULT_PREFIX: &str = "questions";
pub const DEFAULT_MAX_NUM: usize = 1000;
/// Cosmetic delay before focusing a freshly added slot.
pub const FOCUS_DELAY_MS: u64 = 300;

pub const AT_LEAST_ONE_MESSAGE: &str = "You must have at least one question.";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const REMOVE_CONFIRM_PROMPT: &str = "Are you sure you want to delete this question?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsetOptions {
    pub prefix: String,
    /// Blank slots rendered alongside the persisted ones on page load.
    pub extra: usize,
    pub min_num: usize,
    pub max_num: usize,
}

impl Default for FormsetOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            extra: 1,
            min_num: 1,
            max_num: DEFAULT_MAX_NUM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    Active,
    MarkedForDeletion,
}

/// A question already stored server-side, as rendered into the edit page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRow {
    pub id: QuestionId,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSlot {
    index: usize,
    persisted_id: Option<QuestionId>,
    liveness: Liveness,
    values: BTreeMap<String, String>,
    invalid: BTreeSet<String>,
    ordinal: Option<usize>,
}

impl RowSlot {
    fn blank(index: usize, template: &Template) -> Self {
        Self {
            index,
            persisted_id: None,
            liveness: Liveness::Active,
            values: template
                .fields()
                .iter()
                .map(|field| (field.name.clone(), String::new()))
                .collect(),
            invalid: BTreeSet::new(),
            ordinal: None,
        }
    }

    fn persisted(index: usize, row: PersistedRow, template: &Template) -> Self {
        let mut slot = Self::blank(index, template);
        slot.persisted_id = Some(row.id);
        for (field, value) in row.values {
            if template.field(&field).is_some() {
                slot.values.insert(field, value);
            }
        }
        slot
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn persisted_id(&self) -> Option<QuestionId> {
        self.persisted_id
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted_id.is_some()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn is_active(&self) -> bool {
        self.liveness == Liveness::Active
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_invalid(&self, field: &str) -> bool {
        self.invalid.contains(field)
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.invalid.iter().map(String::as_str)
    }

    /// 1-based position among active slots; `None` once marked for deletion.
    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub index: usize,
    pub field: String,
}

/// Result of the pre-submit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub no_active_slots: bool,
    pub offending: Vec<FieldRef>,
    pub updates: Vec<ViewUpdate>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        !self.no_active_slots && self.offending.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Formset {
    options: FormsetOptions,
    template: Template,
    slots: Vec<RowSlot>,
    initial_count: usize,
}

impl Formset {
    /// Builds the page-load state: persisted rows first, then `extra` blank slots.
    /// The template must have been rendered with `options.prefix`.
    pub fn new(
        options: FormsetOptions,
        template: Template,
        persisted: Vec<PersistedRow>,
    ) -> Result<Self, FormsetError> {
        if template.prefix() != options.prefix {
            return Err(FormsetError::PrefixMismatch {
                formset: options.prefix,
                template: template.prefix().to_string(),
            });
        }
        Ok(Self::build(options, template, persisted))
    }

    /// Question formset whose row template is rendered with `options.prefix`.
    pub fn questions(options: FormsetOptions, persisted: Vec<PersistedRow>) -> Self {
        let template = Template::question(&options.prefix);
        Self::build(options, template, persisted)
    }

    fn build(options: FormsetOptions, template: Template, persisted: Vec<PersistedRow>) -> Self {
        let initial_count = persisted.len();
        let mut slots: Vec<RowSlot> = persisted
            .into_iter()
            .enumerate()
            .map(|(index, row)| RowSlot::persisted(index, row, &template))
            .collect();
        for index in initial_count..initial_count + options.extra {
            slots.push(RowSlot::blank(index, &template));
        }

        let mut formset = Self {
            options,
            template,
            slots,
            initial_count,
        };
        formset.renumber_display();
        formset
    }

    pub fn options(&self) -> &FormsetOptions {
        &self.options
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn slots(&self) -> &[RowSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&RowSlot> {
        self.slots.get(index)
    }

    /// Slots ever materialized on this page and not dropped: active plus
    /// marked-for-deletion. Posted as `TOTAL_FORMS`.
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn submission(&self) -> Submission {
        submission::encode(self)
    }

    pub fn apply(&mut self, action: FormsetAction) -> Vec<ViewUpdate> {
        match action {
            FormsetAction::AddRow => self.add_row(),
            FormsetAction::RequestRemove { index } => match self.check_removable(index) {
                Ok(()) => vec![ViewUpdate::ConfirmRemoval {
                    index,
                    prompt: REMOVE_CONFIRM_PROMPT.into(),
                }],
                Err(err) => refusal(err),
            },
            FormsetAction::RemoveRow { index } => {
                self.remove_row(index).unwrap_or_else(refusal)
            }
            FormsetAction::EditField {
                index,
                field,
                value,
            } => self
                .edit_field(index, &field, value)
                .unwrap_or_else(refusal),
            FormsetAction::Submit => self.validate_before_submit().updates,
        }
    }

    pub fn add_row(&mut self) -> Vec<ViewUpdate> {
        let index = self.total_count();
        let markup = self.template.materialize(index);
        self.slots.push(RowSlot::blank(index, &self.template));

        let mut updates = vec![
            ViewUpdate::InsertSlot { index, markup },
            ViewUpdate::SetTotalForms {
                total: self.total_count(),
            },
            ViewUpdate::ScrollTo { index, field: None },
        ];
        if let Some(field) = self.template.focus_field() {
            updates.push(ViewUpdate::FocusField {
                index,
                field: field.to_string(),
                delay_ms: FOCUS_DELAY_MS,
            });
        }
        updates.extend(self.renumber_display());

        debug!(index, total = self.total_count(), "question slot added");
        updates
    }

    pub fn remove_row(&mut self, index: usize) -> Result<Vec<ViewUpdate>, FormsetError> {
        self.check_removable(index)?;

        let mut updates = Vec::new();
        if self.slots[index].is_persisted() {
            let slot = &mut self.slots[index];
            slot.liveness = Liveness::MarkedForDeletion;
            slot.ordinal = None;
            slot.invalid.clear();
            updates.push(ViewUpdate::HideSlot { index });
            debug!(index, total = self.total_count(), "persisted question slot flagged for deletion");
        } else {
            self.slots.remove(index);
            updates.push(ViewUpdate::RemoveSlot { index });
            for slot in &mut self.slots[index..] {
                let from = slot.index;
                slot.index -= 1;
                updates.push(ViewUpdate::ReindexSlot {
                    from,
                    to: slot.index,
                });
            }
            updates.push(ViewUpdate::SetTotalForms {
                total: self.total_count(),
            });
            debug!(index, total = self.total_count(), "new question slot dropped");
        }

        updates.extend(self.renumber_display());
        Ok(updates)
    }

    fn check_removable(&self, index: usize) -> Result<(), FormsetError> {
        let slot = self
            .slots
            .get(index)
            .ok_or(FormsetError::UnknownSlot { index })?;
        if !slot.is_active() {
            return Err(FormsetError::AlreadyDeleted { index });
        }
        if self.active_count() <= 1 {
            return Err(FormsetError::LastActiveSlot { index });
        }
        Ok(())
    }

    /// Pure projection from the slot list to `(index, ordinal)` pairs.
    pub fn display_ordinals(&self) -> Vec<(usize, usize)> {
        self.slots
            .iter()
            .filter(|slot| slot.is_active())
            .enumerate()
            .map(|(position, slot)| (slot.index, position + 1))
            .collect()
    }

    pub fn renumber_display(&mut self) -> Vec<ViewUpdate> {
        let ordinals = self.display_ordinals();
        for slot in &mut self.slots {
            slot.ordinal = None;
        }
        ordinals
            .into_iter()
            .map(|(index, ordinal)| {
                self.slots[index].ordinal = Some(ordinal);
                ViewUpdate::SetOrdinal {
                    index,
                    ordinal,
                    label: format!("Question {ordinal}"),
                }
            })
            .collect()
    }

    /// Stores typed input and clears the field's error marker.
    pub fn edit_field(
        &mut self,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Vec<ViewUpdate>, FormsetError> {
        if self.template.field(field).is_none() {
            return Err(FormsetError::UnknownField {
                index,
                field: field.to_string(),
            });
        }
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(FormsetError::UnknownSlot { index })?;
        if !slot.is_active() {
            return Err(FormsetError::AlreadyDeleted { index });
        }

        slot.values.insert(field.to_string(), value.into());
        if slot.invalid.remove(field) {
            return Ok(vec![ViewUpdate::ClearInvalid {
                index,
                field: field.to_string(),
            }]);
        }
        Ok(Vec::new())
    }

    pub fn validate_before_submit(&mut self) -> Validation {
        if self.active_count() == 0 {
            warn!("submit blocked: no active question slots");
            return Validation {
                no_active_slots: true,
                offending: Vec::new(),
                updates: vec![
                    ViewUpdate::Notify(Notice::error(AT_LEAST_ONE_MESSAGE)),
                    ViewUpdate::BlockSubmit,
                ],
            };
        }

        let mut offending = Vec::new();
        let mut updates = Vec::new();
        for slot in self.slots.iter_mut().filter(|slot| slot.is_active()) {
            for field in self.template.fields().iter().filter(|f| f.is_checked()) {
                let value = slot.values.get(&field.name).map(String::as_str).unwrap_or_default();
                let field_ref = FieldRef {
                    index: slot.index,
                    field: field.name.clone(),
                };
                if field.accepts(value) {
                    if slot.invalid.remove(&field.name) {
                        updates.push(ViewUpdate::ClearInvalid {
                            index: field_ref.index,
                            field: field_ref.field,
                        });
                    }
                } else {
                    slot.invalid.insert(field.name.clone());
                    updates.push(ViewUpdate::MarkInvalid {
                        index: field_ref.index,
                        field: field_ref.field.clone(),
                    });
                    offending.push(field_ref);
                }
            }
        }

        match offending.first() {
            Some(first) => {
                info!(offending = offending.len(), "submit blocked by required fields");
                updates.push(ViewUpdate::Notify(Notice::error(REQUIRED_FIELDS_MESSAGE)));
                updates.push(ViewUpdate::ScrollTo {
                    index: first.index,
                    field: Some(first.field.clone()),
                });
                updates.push(ViewUpdate::FocusField {
                    index: first.index,
                    field: first.field.clone(),
                    delay_ms: 0,
                });
                updates.push(ViewUpdate::BlockSubmit);
            }
            None => {
                info!(
                    total = self.total_count(),
                    active = self.active_count(),
                    "question formset passed validation"
                );
                updates.push(ViewUpdate::AllowSubmit);
            }
        }

        Validation {
            no_active_slots: false,
            offending,
            updates,
        }
    }
}

fn refusal(err: FormsetError) -> Vec<ViewUpdate> {
    warn!(error = %err, "formset action refused");
    err.notice().map(ViewUpdate::Notify).into_iter().collect()
}

#[cfg(test)]
#[path = "tests/formset_tests.rs"]
mod tests;
