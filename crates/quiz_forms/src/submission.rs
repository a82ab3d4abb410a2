//! Encoding of the formset into the field pairs of a standard form post.

use serde::Serialize;

use crate::formset::Formset;

pub const TOTAL_FORMS: &str = "TOTAL_FORMS";
pub const INITIAL_FORMS: &str = "INITIAL_FORMS";
pub const MIN_NUM_FORMS: &str = "MIN_NUM_FORMS";
pub const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";
pub const DELETE_FIELD: &str = "DELETE";
pub const ID_FIELD: &str = "id";

/// Ordered `(name, value)` pairs; serializes as a sequence of tuples, which
/// is what urlencoded form bodies expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Submission {
    fields: Vec<(String, String)>,
}

impl Submission {
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Adds a page-level field such as the CSRF token or the quiz title.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn management_field(prefix: &str, name: &str) -> String {
    format!("{prefix}-{name}")
}

pub fn slot_field(prefix: &str, index: usize, field: &str) -> String {
    format!("{prefix}-{index}-{field}")
}

pub(crate) fn encode(formset: &Formset) -> Submission {
    let options = formset.options();
    let prefix = options.prefix.as_str();
    let mut submission = Submission::default();

    submission.push(
        management_field(prefix, TOTAL_FORMS),
        formset.total_count().to_string(),
    );
    submission.push(
        management_field(prefix, INITIAL_FORMS),
        formset.initial_count().to_string(),
    );
    submission.push(
        management_field(prefix, MIN_NUM_FORMS),
        options.min_num.to_string(),
    );
    submission.push(
        management_field(prefix, MAX_NUM_FORMS),
        options.max_num.to_string(),
    );

    for slot in formset.slots() {
        let index = slot.index();
        if let Some(id) = slot.persisted_id() {
            submission.push(slot_field(prefix, index, ID_FIELD), id.to_string());
        }
        for field in formset.template().fields() {
            submission.push(
                slot_field(prefix, index, &field.name),
                slot.value(&field.name),
            );
        }
        if !slot.is_active() {
            submission.push(slot_field(prefix, index, DELETE_FIELD), "on");
        }
    }

    submission
}
