//! Row templates and the placeholder protocol used to materialize new slots.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::domain::CorrectOption;

use crate::error::TemplateError;

/// Replaced by the slot's absolute index wherever it appears (field names, ids).
pub const INDEX_PLACEHOLDER: &str = "__prefix__";
/// Replaced by the 1-based ordinal shown to the user.
pub const ORDINAL_PLACEHOLDER: &str = "__num__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        required: bool,
        multiline: bool,
        max_length: usize,
    },
    Choice {
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(name: &str, label: &str, required: bool, max_length: usize) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Text {
                required,
                multiline: false,
                max_length,
            },
        }
    }

    pub fn textarea(name: &str, label: &str, required: bool, max_length: usize) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Text {
                required,
                multiline: true,
                max_length,
            },
        }
    }

    pub fn choice(name: &str, label: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Choice {
                options: options.iter().map(|option| option.to_string()).collect(),
            },
        }
    }

    /// Whether the field takes part in the pre-submit check at all.
    pub fn is_checked(&self) -> bool {
        match &self.kind {
            FieldKind::Text { required, .. } => *required,
            FieldKind::Choice { .. } => true,
        }
    }

    /// Required text must be non-blank after trimming; a choice must hold one
    /// of its options. Optional text always passes.
    pub fn accepts(&self, value: &str) -> bool {
        match &self.kind {
            FieldKind::Text { required, .. } => !*required || !value.trim().is_empty(),
            FieldKind::Choice { options } => options.iter().any(|option| option == value),
        }
    }
}

/// Inert blueprint for one question slot. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    markup: String,
    fields: Vec<FieldSpec>,
}

impl Template {
    /// `prefix` is the formset prefix the markup's field names were rendered with.
    pub fn new(
        prefix: impl Into<String>,
        markup: impl Into<String>,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, TemplateError> {
        let markup = markup.into();
        if !markup.contains(INDEX_PLACEHOLDER) {
            return Err(TemplateError::MissingIndexPlaceholder {
                placeholder: INDEX_PLACEHOLDER,
            });
        }
        if fields.is_empty() {
            return Err(TemplateError::NoFields);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(TemplateError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self {
            prefix: prefix.into(),
            markup,
            fields,
        })
    }

    /// The multiple-choice question row used by the quiz editor.
    pub fn question(prefix: &str) -> Self {
        let options: Vec<&str> = CorrectOption::ALL.iter().map(|o| o.as_str()).collect();
        let fields = vec![
            FieldSpec::textarea("text", "Question", true, 500),
            FieldSpec::text("option_a", "Option A", true, 200),
            FieldSpec::text("option_b", "Option B", true, 200),
            FieldSpec::text("option_c", "Option C", true, 200),
            FieldSpec::text("option_d", "Option D", true, 200),
            FieldSpec::choice("correct_answer", "Correct Answer", &options),
            FieldSpec::textarea("explanation", "Explanation", false, 500),
        ];
        let markup = render_row_markup(prefix, &fields);
        Self {
            prefix: prefix.to_string(),
            markup,
            fields,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// First text field; receives focus when a slot is added.
    pub fn focus_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| matches!(field.kind, FieldKind::Text { .. }))
            .map(|field| field.name.as_str())
    }

    pub fn materialize(&self, index: usize) -> String {
        self.markup
            .replace(INDEX_PLACEHOLDER, &index.to_string())
            .replace(ORDINAL_PLACEHOLDER, &(index + 1).to_string())
    }
}

fn render_row_markup(prefix: &str, fields: &[FieldSpec]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<div class=\"question-form-card\" data-index=\"{INDEX_PLACEHOLDER}\">\n"
    ));
    out.push_str(&format!(
        "  <span class=\"question-number\">Question {ORDINAL_PLACEHOLDER}</span>\n"
    ));
    out.push_str("  <button type=\"button\" class=\"delete-question\">Delete</button>\n");
    for field in fields {
        let name = format!("{prefix}-{INDEX_PLACEHOLDER}-{}", field.name);
        out.push_str(&format!("  <label for=\"id_{name}\">{}</label>\n", field.label));
        match &field.kind {
            FieldKind::Text {
                multiline: true,
                max_length,
                ..
            } => out.push_str(&format!(
                "  <textarea class=\"form-control\" name=\"{name}\" id=\"id_{name}\" maxlength=\"{max_length}\"></textarea>\n"
            )),
            FieldKind::Text { max_length, .. } => out.push_str(&format!(
                "  <input type=\"text\" class=\"form-control\" name=\"{name}\" id=\"id_{name}\" maxlength=\"{max_length}\">\n"
            )),
            FieldKind::Choice { options } => {
                out.push_str(&format!(
                    "  <select class=\"form-select\" name=\"{name}\" id=\"id_{name}\">\n"
                ));
                out.push_str("    <option value=\"\" selected>---------</option>\n");
                for option in options {
                    out.push_str(&format!("    <option value=\"{option}\">{option}</option>\n"));
                }
                out.push_str("  </select>\n");
            }
        }
    }
    out.push_str("</div>\n");
    out
}
