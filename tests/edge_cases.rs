use fieldgate::{
    field_ref, line, Comparator, Diagnostic, Engine, EngineOptions, Field, FieldType, FieldValue,
    FieldValueStore, ResolvedAction, RuleSet, RuleSetBuilder, RuleSetError, SideEffect,
};

fn hide_b_when_a_is_yes() -> RuleSet {
    RuleSetBuilder::new()
        .conditional("con_1", |c| c.hide().when(line("fld_A").is("yes")).target("fld_B"))
        .compile()
        .unwrap()
}

#[test]
fn hide_on_answer_round_trip() {
    let mut engine = Engine::initialize(
        hide_b_when_a_is_yes(),
        FieldValueStore::new().with("fld_B", "some note"),
    );

    let report = engine.on_field_changed("fld_A", "yes");
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Hidden);
    assert_eq!(engine.value("fld_B"), None);
    assert_eq!(
        report.side_effects(),
        &[
            SideEffect::Hide("fld_B".into()),
            SideEffect::ClearValue("fld_B".into()),
        ]
    );

    let _ = engine.on_field_changed("fld_A", "no");
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Visible);
    // the cleared value stays cleared until the user types again
    assert_eq!(engine.value("fld_B"), None);
}

#[test]
fn contains_matches_substring() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.hide().when(line("fld_A").contains("wor")).target("fld_B"))
        .compile()
        .unwrap();
    let engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_A", "hello world"));
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Hidden);
}

#[test]
fn later_conditional_wins_conflict() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.show().when(line("fld_X").is("a")).target("fld_C"))
        .conditional("con_2", |c| c.hide().when(line("fld_X").is("a")).target("fld_C"))
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new());
    let report = engine.on_field_changed("fld_X", "a");

    assert_eq!(engine.resolved_action("fld_C"), ResolvedAction::Hidden);
    assert_eq!(
        report.evaluated(),
        &[("con_1".to_owned(), true), ("con_2".to_owned(), true)]
    );
}

#[test]
fn non_numeric_greater_on_dropdown_fails_closed() {
    let ruleset = RuleSetBuilder::new()
        .field(Field::new("fld_color", FieldType::Dropdown).with_options(["red", "green", "blue"]))
        .conditional("con_1", |c| c.hide().when(line("fld_color").greater("red")).target("fld_B"))
        .compile()
        .unwrap();
    let engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_color", "green"));
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Visible);
}

#[test]
fn unknown_comparator_never_fires() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| {
            c.hide()
                .when(line("fld_A").compare(Comparator::Unknown("like".into()), "x"))
                .target("fld_B")
        })
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new());
    let _ = engine.on_field_changed("fld_A", "x");
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Visible);
}

#[test]
fn missing_field_reads_as_unset() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.show().when(line("fld_missing").isnot("")).target("fld_B"))
        .compile()
        .unwrap();
    let engine = Engine::initialize(ruleset, FieldValueStore::new());
    assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Hidden);
}

#[test]
fn self_target_is_rejected() {
    let result = RuleSetBuilder::new()
        .conditional("con_1", |c| c.hide().when(line("fld_A").is("x")).target("fld_A"))
        .compile();
    assert!(matches!(result, Err(RuleSetError::SelfTarget { .. })));
}

#[test]
fn two_field_cycle_terminates_with_diagnostic() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.hide().when(line("fld_X").isnot("")).target("fld_Y"))
        .conditional("con_2", |c| c.hide().when(line("fld_Y").is("")).target("fld_X"))
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_Y", "y"));
    let report = engine.on_field_changed("fld_X", "x");

    assert!(report
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::Cycle { field, .. } if field == "fld_X")));
    assert_eq!(engine.resolved_action("fld_X"), ResolvedAction::Hidden);
    assert_eq!(engine.resolved_action("fld_Y"), ResolvedAction::Hidden);
}

#[test]
fn untargeted_field_ignores_every_value() {
    let mut engine = Engine::initialize(hide_b_when_a_is_yes(), FieldValueStore::new());
    for value in ["yes", "no", "", "anything"] {
        let _ = engine.on_field_changed("fld_A", value);
        assert_eq!(engine.resolved_action("fld_A"), ResolvedAction::Visible);
        assert_eq!(engine.resolved_action("fld_Z"), ResolvedAction::Visible);
    }
}

#[test]
fn inactive_conditionals_have_no_effect() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.name("").hide().when(line("fld_A").is("")).target("fld_B"))
        .conditional("con_2", |c| c.when(line("fld_A").is("")).target("fld_C"))
        .conditional("con_3", |c| c.hide().target("fld_D"))
        .compile()
        .unwrap();
    let engine = Engine::initialize(ruleset, FieldValueStore::new());
    for field in ["fld_B", "fld_C", "fld_D"] {
        assert_eq!(engine.resolved_action(field), ResolvedAction::Visible);
    }
    assert!(engine.ruleset().affected_by("fld_A").is_empty());
}

#[test]
fn field_reference_operand_tracks_other_field() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| {
            c.disable()
                .when(line("fld_confirm").isnot(field_ref("fld_email")))
                .target("fld_submit")
        })
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new());
    assert_eq!(engine.resolved_action("fld_submit"), ResolvedAction::Enabled);

    let _ = engine.on_field_changed("fld_email", "a@b.c");
    assert_eq!(engine.resolved_action("fld_submit"), ResolvedAction::Disabled);

    let _ = engine.on_field_changed("fld_confirm", "a@b.c");
    assert_eq!(engine.resolved_action("fld_submit"), ResolvedAction::Enabled);
}

#[test]
fn checkbox_membership() {
    let ruleset = RuleSetBuilder::new()
        .field(Field::new("fld_toppings", FieldType::Checkbox).with_options(["ham", "olives", "onion"]))
        .conditional("con_1", |c| c.show().when(line("fld_toppings").is("olives")).target("fld_pits"))
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new());
    assert_eq!(engine.resolved_action("fld_pits"), ResolvedAction::Hidden);

    let _ = engine.on_field_changed("fld_toppings", vec!["ham", "olives"]);
    assert_eq!(engine.resolved_action("fld_pits"), ResolvedAction::Visible);

    // reordering the ticked options is not a change
    let report = engine.on_field_changed("fld_toppings", vec!["olives", "ham"]);
    assert!(report.is_noop());
}

#[test]
fn numeric_comparison_on_text_input() {
    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| c.show().when(line("fld_age").smaller(18_i64)).target("fld_guardian"))
        .compile()
        .unwrap();
    let mut engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_age", " 17 "));
    assert_eq!(engine.resolved_action("fld_guardian"), ResolvedAction::Visible);

    let _ = engine.on_field_changed("fld_age", 18_i64);
    assert_eq!(engine.resolved_action("fld_guardian"), ResolvedAction::Hidden);

    let _ = engine.on_field_changed("fld_age", "unknown");
    assert_eq!(engine.resolved_action("fld_guardian"), ResolvedAction::Hidden);
}

#[test]
fn hidden_fields_are_left_out_of_submission() {
    let mut engine = Engine::initialize_with(
        hide_b_when_a_is_yes(),
        FieldValueStore::new().with("fld_A", "no").with("fld_B", "kept"),
        EngineOptions::new().with_clear_hidden_values(false),
    );
    assert_eq!(engine.submission().len(), 2);

    let _ = engine.on_field_changed("fld_A", "yes");
    let submission = engine.submission();
    assert_eq!(submission.len(), 1);
    assert_eq!(submission.get("fld_A"), Some(&FieldValue::from("yes")));
    assert_eq!(engine.value("fld_B"), Some(&FieldValue::from("kept")));
}

#[test]
fn long_cascade_settles_in_one_pass() {
    // fld_0 -> fld_1 -> ... -> fld_20, each shown only while the previous holds a value
    let mut builder = RuleSetBuilder::new();
    for i in 1..=20 {
        let prev = format!("fld_{}", i - 1);
        let next = format!("fld_{i}");
        builder = builder.conditional(&format!("con_{i}"), move |c| {
            c.show().when(line(&prev).isnot("")).target(&next)
        });
    }
    let ruleset = builder.compile().unwrap();
    let initial: FieldValueStore = (0..=20).map(|i| (format!("fld_{i}"), "x")).collect();
    let mut engine = Engine::initialize(ruleset, initial);
    assert_eq!(engine.resolved_action("fld_20"), ResolvedAction::Visible);

    let report = engine.on_field_cleared("fld_0");
    assert_eq!(report.delta().len(), 20);
    assert!(report.diagnostics().is_empty());
    for i in 1..=20 {
        let field = format!("fld_{i}");
        assert_eq!(engine.resolved_action(&field), ResolvedAction::Hidden);
        assert_eq!(engine.value(&field), None);
    }
}

#[test]
fn pass_report_display() {
    let mut engine = Engine::initialize(hide_b_when_a_is_yes(), FieldValueStore::new());
    let report = engine.on_field_changed("fld_A", "yes");
    let text = report.to_string();
    assert!(text.starts_with("delta: [fld_B: visible -> hidden], effects: [hide fld_B, clear fld_B]"));
}
