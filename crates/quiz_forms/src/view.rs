//! Actions fed into the formset reducer and the view updates it emits.

use serde::{Deserialize, Serialize};
use shared::notice::Notice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum FormsetAction {
    AddRow,
    /// Delete button pressed; the view must confirm before `RemoveRow`.
    RequestRemove {
        index: usize,
    },
    RemoveRow {
        index: usize,
    },
    EditField {
        index: usize,
        field: String,
        value: String,
    },
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewUpdate {
    InsertSlot {
        index: usize,
        markup: String,
    },
    RemoveSlot {
        index: usize,
    },
    /// Field names of a never-persisted slot move from one absolute index to another.
    ReindexSlot {
        from: usize,
        to: usize,
    },
    HideSlot {
        index: usize,
    },
    SetTotalForms {
        total: usize,
    },
    SetOrdinal {
        index: usize,
        ordinal: usize,
        label: String,
    },
    MarkInvalid {
        index: usize,
        field: String,
    },
    ClearInvalid {
        index: usize,
        field: String,
    },
    FocusField {
        index: usize,
        field: String,
        delay_ms: u64,
    },
    ScrollTo {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
    ConfirmRemoval {
        index: usize,
        prompt: String,
    },
    Notify(Notice),
    AllowSubmit,
    BlockSubmit,
}

impl ViewUpdate {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Notify(notice) => Some(notice),
            _ => None,
        }
    }
}
