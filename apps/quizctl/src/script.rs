//! JSON action scripts replayed against a formset.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use quiz_forms::{Formset, FormsetAction, FormsetOptions, PersistedRow, ViewUpdate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FormsetScript {
    #[serde(default)]
    pub extra: Option<usize>,
    #[serde(default)]
    pub persisted: Vec<PersistedRow>,
    pub actions: Vec<FormsetAction>,
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: FormsetAction,
    pub updates: Vec<ViewUpdate>,
}

pub fn load_script(path: &Path) -> Result<FormsetScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read formset script '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse formset script '{}'", path.display()))
}

/// Builds the page-load formset and replays every scripted action.
pub fn replay(script: FormsetScript, prefix: &str) -> (Formset, Vec<StepReport>) {
    let mut options = FormsetOptions {
        prefix: prefix.to_string(),
        ..FormsetOptions::default()
    };
    if let Some(extra) = script.extra {
        options.extra = extra;
    }

    let mut formset = Formset::questions(options, script.persisted);
    let reports = script
        .actions
        .into_iter()
        .enumerate()
        .map(|(step, action)| {
            let updates = formset.apply(action.clone());
            StepReport {
                step,
                action,
                updates,
            }
        })
        .collect();
    (formset, reports)
}
