use crate::sim::{EventScheduler, ScenarioError, ScenarioSpec, SimTime, load_scenario};
use crate::trace::DispatchOutcome;
use serde_json::json;

#[test]
fn scenario_spec_parses_minimal_json_with_defaults() {
    let raw = r#"
    {
        "schema_version": 1,
        "events": [ { "time": 5 } ]
    }
    "#;
    let spec = ScenarioSpec::from_json(raw).expect("parse scenario");
    assert!(spec.meta.is_none());
    assert_eq!(spec.events.len(), 1);
    let ev = &spec.events[0];
    assert_eq!(ev.time, 5);
    assert!(ev.context.is_empty());
    assert!(!ev.cancelled);
    assert!(ev.fail.is_none());
    assert!(ev.followups.is_empty());
}

#[test]
fn scenario_spec_rejects_unknown_schema_version() {
    let err = ScenarioSpec::from_json(r#"{ "schema_version": 9 }"#).expect_err("must reject");
    assert!(matches!(err, ScenarioError::UnsupportedSchema(9)));

    let err = ScenarioSpec::from_json("{ not json").expect_err("must reject");
    assert!(matches!(err, ScenarioError::Parse(_)));
}

#[test]
fn load_scenario_runs_followups_and_honours_cancellation() {
    let raw = r#"
    {
        "schema_version": 1,
        "meta": { "name": "mm1" },
        "events": [
            { "time": 20, "context": { "kind": "late" } },
            { "time": 10, "context": { "kind": "arrival" },
              "followups": [ { "delay": 3, "context": { "kind": "departure" } } ] },
            { "time": 12, "context": { "kind": "dropped" }, "cancelled": true }
        ]
    }
    "#;
    let spec = ScenarioSpec::from_json(raw).expect("parse scenario");
    assert_eq!(spec.meta.as_ref().and_then(|m| m.name.as_deref()), Some("mm1"));

    let mut sched = EventScheduler::<SimTime>::new();
    sched.enable_log();
    let handles = load_scenario(&spec, &mut sched);
    assert_eq!(handles.len(), 3);
    assert!(handles[2].is_cancelled());

    assert_eq!(sched.run().expect("run"), 4);
    let log = sched.log().expect("log enabled");
    let kinds: Vec<_> = log.iter().map(|r| (r.t, r.context["kind"].clone())).collect();
    assert_eq!(
        kinds,
        vec![
            (SimTime(10), json!("arrival")),
            (SimTime(12), json!("dropped")),
            (SimTime(13), json!("departure")),
            (SimTime(20), json!("late")),
        ]
    );
    assert_eq!(log.records[1].outcome, DispatchOutcome::Skipped);
    assert_eq!(sched.current_time(), SimTime(20));
}

#[test]
fn scripted_failure_stops_the_run() {
    let raw = r#"
    {
        "schema_version": 1,
        "events": [
            { "time": 1, "fail": "disk full" },
            { "time": 2 }
        ]
    }
    "#;
    let spec = ScenarioSpec::from_json(raw).expect("parse scenario");
    let mut sched = EventScheduler::<SimTime>::new();
    load_scenario(&spec, &mut sched);

    let err = sched.run().expect_err("scripted failure");
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(sched.current_time(), SimTime(1));
    assert_eq!(sched.len(), 1);
}

#[test]
fn missing_schema_version_is_rejected_as_unsupported() {
    let err = ScenarioSpec::from_json(r#"{ "events": [] }"#).expect_err("must reject");
    assert!(matches!(err, ScenarioError::UnsupportedSchema(0)));
}
