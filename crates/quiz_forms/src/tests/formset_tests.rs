use super::*;
use shared::notice::NoticeLevel;

fn options(extra: usize) -> FormsetOptions {
    FormsetOptions {
        extra,
        ..FormsetOptions::default()
    }
}

fn persisted(id: i64, text: &str) -> PersistedRow {
    let values = [
        ("text", text),
        ("option_a", "a"),
        ("option_b", "b"),
        ("option_c", "c"),
        ("option_d", "d"),
        ("correct_answer", "B"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    PersistedRow {
        id: QuestionId(id),
        values,
    }
}

fn fill(formset: &mut Formset, index: usize) {
    for (field, value) in [
        ("text", "What does `?` do?"),
        ("option_a", "Panics"),
        ("option_b", "Propagates the error"),
        ("option_c", "Ignores the error"),
        ("option_d", "Logs the error"),
        ("correct_answer", "B"),
    ] {
        formset.edit_field(index, field, value).expect("edit");
    }
}

fn ordinals(formset: &Formset) -> Vec<Option<usize>> {
    formset.slots().iter().map(RowSlot::ordinal).collect()
}

#[test]
fn add_row_three_times_from_empty() {
    let mut formset = Formset::questions(options(0), Vec::new());
    assert_eq!(formset.total_count(), 0);

    let mut inserted = Vec::new();
    for _ in 0..3 {
        for update in formset.add_row() {
            if let ViewUpdate::InsertSlot { index, markup } = update {
                inserted.push((index, markup));
            }
        }
    }

    assert_eq!(formset.total_count(), 3);
    assert_eq!(
        inserted.iter().map(|(index, _)| *index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    for (index, markup) in &inserted {
        assert!(markup.contains(&format!("name=\"questions-{index}-text\"")));
        assert!(markup.contains(&format!("Question {}", index + 1)));
    }
    assert_eq!(ordinals(&formset), vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn add_row_syncs_counter_and_focuses_question_text() {
    let mut formset = Formset::questions(options(1), Vec::new());
    let updates = formset.add_row();

    assert!(updates.contains(&ViewUpdate::SetTotalForms { total: 2 }));
    assert!(updates.contains(&ViewUpdate::FocusField {
        index: 1,
        field: "text".into(),
        delay_ms: FOCUS_DELAY_MS,
    }));
    assert!(updates.contains(&ViewUpdate::SetOrdinal {
        index: 1,
        ordinal: 2,
        label: "Question 2".into(),
    }));
}

#[test]
fn removing_persisted_slot_flags_and_hides_it() {
    let mut formset = Formset::questions(
        options(0),
        vec![persisted(1, "first"), persisted(2, "second")],
    );
    assert_eq!(formset.total_count(), 2);

    let updates = formset.remove_row(0).expect("remove");

    assert!(updates.contains(&ViewUpdate::HideSlot { index: 0 }));
    assert!(!updates
        .iter()
        .any(|u| matches!(u, ViewUpdate::SetTotalForms { .. })));
    assert_eq!(formset.total_count(), 2);
    assert_eq!(formset.active_count(), 1);
    assert_eq!(
        formset.slot(0).map(RowSlot::liveness),
        Some(Liveness::MarkedForDeletion)
    );
    assert_eq!(ordinals(&formset), vec![None, Some(1)]);
    assert!(updates.contains(&ViewUpdate::SetOrdinal {
        index: 1,
        ordinal: 1,
        label: "Question 1".into(),
    }));
}

#[test]
fn refuses_to_remove_last_active_slot() {
    let mut formset = Formset::questions(options(1), Vec::new());

    let err = formset.remove_row(0).expect_err("should refuse");
    assert_eq!(err, FormsetError::LastActiveSlot { index: 0 });
    assert_eq!(formset.active_count(), 1);
    assert_eq!(formset.total_count(), 1);

    let updates = formset.apply(FormsetAction::RemoveRow { index: 0 });
    let notice = updates
        .iter()
        .find_map(ViewUpdate::notice)
        .expect("warning notice");
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.message, AT_LEAST_ONE_MESSAGE);
    assert_eq!(formset.active_count(), 1);
}

#[test]
fn removing_new_slot_decrements_and_reindexes_later_new_slots() {
    let mut formset = Formset::questions(
        options(0),
        vec![persisted(7, "kept")],
    );
    formset.add_row();
    formset.add_row();
    formset.add_row();
    formset
        .edit_field(3, "text", "last one")
        .expect("edit");

    let updates = formset.remove_row(1).expect("remove");

    assert_eq!(formset.total_count(), 3);
    assert_eq!(updates[0], ViewUpdate::RemoveSlot { index: 1 });
    assert!(updates.contains(&ViewUpdate::ReindexSlot { from: 2, to: 1 }));
    assert!(updates.contains(&ViewUpdate::ReindexSlot { from: 3, to: 2 }));
    assert!(updates.contains(&ViewUpdate::SetTotalForms { total: 3 }));
    let indices: Vec<usize> = formset.slots().iter().map(RowSlot::index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(formset.slot(2).map(|s| s.value("text")), Some("last one"));
    assert_eq!(ordinals(&formset), vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn request_remove_asks_for_confirmation_first() {
    let mut formset = Formset::questions(options(2), Vec::new());
    let updates = formset.apply(FormsetAction::RequestRemove { index: 1 });
    assert_eq!(
        updates,
        vec![ViewUpdate::ConfirmRemoval {
            index: 1,
            prompt: REMOVE_CONFIRM_PROMPT.into(),
        }]
    );
    assert_eq!(formset.total_count(), 2);
}

#[test]
fn removing_deleted_or_unknown_slot_is_refused_silently() {
    let mut formset = Formset::questions(
        options(1),
        vec![persisted(1, "first")],
    );
    formset.remove_row(0).expect("remove");

    assert_eq!(
        formset.remove_row(0),
        Err(FormsetError::AlreadyDeleted { index: 0 })
    );
    assert_eq!(
        formset.remove_row(9),
        Err(FormsetError::UnknownSlot { index: 9 })
    );
    assert!(formset.apply(FormsetAction::RemoveRow { index: 9 }).is_empty());
}

#[test]
fn renumber_display_is_idempotent() {
    let mut formset = Formset::questions(
        options(2),
        vec![persisted(1, "first"), persisted(2, "second")],
    );
    formset.remove_row(1).expect("remove");

    let once = formset.renumber_display();
    let after_once = ordinals(&formset);
    let twice = formset.renumber_display();
    assert_eq!(once, twice);
    assert_eq!(after_once, ordinals(&formset));
    assert_eq!(after_once, vec![Some(1), None, Some(2), Some(3)]);
}

#[test]
fn single_filled_slot_is_valid_without_markers() {
    let mut formset = Formset::questions(options(1), Vec::new());
    fill(&mut formset, 0);

    let validation = formset.validate_before_submit();
    assert!(validation.is_valid());
    assert_eq!(validation.updates, vec![ViewUpdate::AllowSubmit]);
    assert_eq!(formset.slot(0).map(|s| s.invalid_fields().count()), Some(0));
}

#[test]
fn empty_required_field_marks_only_that_field() {
    let mut formset = Formset::questions(options(1), Vec::new());
    fill(&mut formset, 0);
    formset.edit_field(0, "option_c", "   ").expect("edit");

    let validation = formset.validate_before_submit();
    assert!(!validation.is_valid());
    assert_eq!(
        validation.offending,
        vec![FieldRef {
            index: 0,
            field: "option_c".into(),
        }]
    );
    let slot = formset.slot(0).expect("slot");
    assert_eq!(slot.invalid_fields().collect::<Vec<_>>(), vec!["option_c"]);
    assert!(!slot.is_invalid("text"));

    let notices: Vec<_> = validation
        .updates
        .iter()
        .filter_map(ViewUpdate::notice)
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, REQUIRED_FIELDS_MESSAGE);
    assert!(validation.updates.contains(&ViewUpdate::ScrollTo {
        index: 0,
        field: Some("option_c".into()),
    }));
    assert_eq!(validation.updates.last(), Some(&ViewUpdate::BlockSubmit));
}

#[test]
fn missing_choice_is_an_error() {
    let mut formset = Formset::questions(options(1), Vec::new());
    fill(&mut formset, 0);
    formset.edit_field(0, "correct_answer", "").expect("edit");

    let validation = formset.validate_before_submit();
    assert!(formset
        .slot(0)
        .is_some_and(|slot| slot.is_invalid("correct_answer")));
    assert_eq!(validation.offending.len(), 1);
}

#[test]
fn editing_clears_marker_and_revalidation_clears_fixed_fields() {
    let mut formset = Formset::questions(options(2), Vec::new());
    fill(&mut formset, 0);

    let first = formset.validate_before_submit();
    assert!(first.offending.iter().all(|f| f.index == 1));
    assert!(first.offending.len() >= 6);

    let cleared = formset.edit_field(1, "text", "filled").expect("edit");
    assert_eq!(
        cleared,
        vec![ViewUpdate::ClearInvalid {
            index: 1,
            field: "text".into(),
        }]
    );

    fill(&mut formset, 1);
    let second = formset.validate_before_submit();
    assert!(second.is_valid());
    assert!(second
        .updates
        .iter()
        .all(|u| !matches!(u, ViewUpdate::MarkInvalid { .. })));
}

#[test]
fn deleted_slots_are_not_validated() {
    let mut formset = Formset::questions(
        options(1),
        vec![PersistedRow {
            id: QuestionId(3),
            values: Default::default(),
        }],
    );
    fill(&mut formset, 1);
    formset.remove_row(0).expect("remove");

    assert!(formset.validate_before_submit().is_valid());
}

#[test]
fn no_active_slot_blocks_submission() {
    let mut formset = Formset::questions(options(0), Vec::new());
    let validation = formset.validate_before_submit();
    assert!(validation.no_active_slots);
    assert!(!validation.is_valid());
    assert_eq!(validation.updates.last(), Some(&ViewUpdate::BlockSubmit));
}

#[test]
fn unknown_field_is_rejected() {
    let mut formset = Formset::questions(options(1), Vec::new());
    assert_eq!(
        formset.edit_field(0, "option_e", "x"),
        Err(FormsetError::UnknownField {
            index: 0,
            field: "option_e".into(),
        })
    );
}

#[test]
fn submission_carries_management_form_and_delete_flags() {
    let mut formset = Formset::questions(
        options(1),
        vec![persisted(11, "first"), persisted(12, "second")],
    );
    fill(&mut formset, 2);
    formset.remove_row(0).expect("remove");

    let submission = formset.submission();
    assert_eq!(submission.get("questions-TOTAL_FORMS"), Some("3"));
    assert_eq!(submission.get("questions-INITIAL_FORMS"), Some("2"));
    assert_eq!(submission.get("questions-MIN_NUM_FORMS"), Some("1"));
    assert_eq!(submission.get("questions-MAX_NUM_FORMS"), Some("1000"));
    assert_eq!(submission.get("questions-0-id"), Some("11"));
    assert_eq!(submission.get("questions-0-DELETE"), Some("on"));
    assert_eq!(submission.get("questions-1-DELETE"), None);
    assert_eq!(submission.get("questions-1-text"), Some("second"));
    assert_eq!(submission.get("questions-2-id"), None);
    assert_eq!(submission.get("questions-2-correct_answer"), Some("B"));
}

#[test]
fn actions_deserialize_from_tagged_json() {
    let actions: Vec<FormsetAction> = serde_json::from_str(
        r#"[
            {"type":"add_row"},
            {"type":"edit_field","payload":{"index":0,"field":"text","value":"Q?"}},
            {"type":"remove_row","payload":{"index":1}},
            {"type":"submit"}
        ]"#,
    )
    .expect("decode");
    assert_eq!(actions[0], FormsetAction::AddRow);
    assert_eq!(actions[2], FormsetAction::RemoveRow { index: 1 });
    assert_eq!(actions[3], FormsetAction::Submit);
}

#[test]
fn template_rendered_for_another_prefix_is_refused() {
    let err = Formset::new(options(1), Template::question("items"), Vec::new())
        .expect_err("should refuse");
    assert_eq!(
        err,
        FormsetError::PrefixMismatch {
            formset: DEFAULT_PREFIX.into(),
            template: "items".into(),
        }
    );
    assert!(err.notice().is_none());
}

#[test]
fn question_formset_names_fields_with_its_own_prefix() {
    let custom = FormsetOptions {
        prefix: "items".into(),
        ..options(1)
    };
    let mut formset = Formset::new(custom.clone(), Template::question("items"), Vec::new())
        .expect("matching prefix");
    fill(&mut formset, 0);
    let submission = formset.submission();
    assert_eq!(submission.get("items-TOTAL_FORMS"), Some("1"));
    assert_eq!(submission.get("items-0-correct_answer"), Some("B"));

    let built = Formset::questions(custom, Vec::new());
    assert_eq!(built.template().prefix(), "items");
    assert!(built.template().materialize(0).contains("name=\"items-0-text\""));
}
