use std::sync::Arc;
use std::thread;

use fieldgate::{line, Engine, FieldValueStore, RuleSetBuilder};

fn main() {
    let ruleset = Arc::new(
        RuleSetBuilder::new()
            .conditional("con_minor", |c| {
                c.show().when(line("fld_age").smaller(18_i64)).target("fld_guardian")
            })
            .compile()
            .expect("failed to compile rule set"),
    );

    // one form instance per thread, the rule set shared read-only
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let rs = Arc::clone(&ruleset);
            thread::spawn(move || {
                let age = 15_i64 + i64::from(i);
                let mut engine = Engine::initialize(rs, FieldValueStore::new());
                let _ = engine.on_field_changed("fld_age", age);
                (age, engine.resolved_action("fld_guardian"))
            })
        })
        .collect();

    for h in handles {
        let (age, action) = h.join().expect("thread panicked");
        println!("age {age}: guardian field {action}");
    }
}
