use fieldgate::{line, Engine, FieldValueStore, RuleSetBuilder};
use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG=fieldgate=debug shows every evaluated conditional
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ruleset = RuleSetBuilder::new()
        .conditional("con_1", |c| {
            c.name("Hide note when answered yes")
                .hide()
                .when(line("fld_A").is("yes"))
                .target("fld_B")
        })
        .compile()
        .expect("failed to compile rule set");

    println!("{ruleset}");

    let mut engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_B", "a note"));
    println!("fld_B: {} ({:?})", engine.resolved_action("fld_B"), engine.value("fld_B"));

    for answer in ["yes", "no"] {
        let report = engine.on_field_changed("fld_A", answer);
        println!("fld_A = {answer}: {report}");
        println!("fld_B: {} ({:?})", engine.resolved_action("fld_B"), engine.value("fld_B"));
    }

    println!("submitted: {:?}", engine.submission());
}
