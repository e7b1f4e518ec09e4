use fieldgate::{Engine, FieldValueStore, RuleSet};

const RULES: &str = r#"{
    "con_ship": {
        "name": "Separate shipping address",
        "type": "show",
        "group": {
            "cl_1": { "field": "fld_same_address", "compare": "isnot", "value": "yes" }
        },
        "fields": ["fld_ship_street", "fld_ship_city"]
    },
    "con_confirm": {
        "name": "Emails must match",
        "type": "disable",
        "group": {
            "cl_1": { "field": "fld_email_confirm", "compare": "isnot", "value": "%fld_email%" }
        },
        "fields": ["fld_submit"]
    }
}"#;

fn main() {
    let ruleset = RuleSet::from_json(RULES).expect("failed to load rules");
    println!("{ruleset}");
    for id in ruleset.conditional_order() {
        println!("  {id}: not allowed to target {:?}", ruleset.fields_not_allowed(id));
    }

    let mut engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_same_address", "yes"));
    let steps: [(&str, &str); 4] = [
        ("fld_same_address", "no"),
        ("fld_email", "me@example.com"),
        ("fld_email_confirm", "me@example.co"),
        ("fld_email_confirm", "me@example.com"),
    ];
    for (field, value) in steps {
        let report = engine.on_field_changed(field, value);
        println!("{field} = {value:?}: {report}");
    }

    for (field, action) in engine.resolved_state().iter() {
        println!("{field}: {action}");
    }

    // the rules go back out in the same shape they came in
    println!("{}", engine.ruleset().to_json());
}
