//! Client-side form state for the quiz pages: the question formset on the
//! create/edit page, the answer sheet on the take page and the generator
//! submit guard. Every component is a reducer that mutates its own state and
//! returns the view updates a renderer has to apply.

pub mod answer_sheet;
pub mod error;
pub mod formset;
pub mod submission;
pub mod submit_guard;
pub mod template;
pub mod view;

pub use answer_sheet::{AnswerSheet, SheetAction, SheetUpdate};
pub use error::{AnswerSheetError, FormsetError, TemplateError};
pub use formset::{
    FieldRef, Formset, FormsetOptions, Liveness, PersistedRow, RowSlot, Validation,
};
pub use submission::Submission;
pub use submit_guard::{GuardUpdate, SubmitGuard};
pub use template::{FieldKind, FieldSpec, Template};
pub use view::{FormsetAction, ViewUpdate};
