//! Task graph construction from configuration documents.

use std::time::Duration;

use sensor_monitor::config::{DispatchMode, SystemConfig};
use sensor_monitor::error::{ConfigFault, Error};
use sensor_monitor::graph::TaskGraph;
use sensor_monitor::tasks::TaskId;
use sensor_monitor::timing::cycle_period;

#[test]
fn json_document_selects_cyclic_dispatch() {
    let config =
        SystemConfig::from_json(r#"{"dispatch":"Cyclic","slot_width_us":5000,"rate_amplifier":2.0}"#)
            .unwrap();
    let graph = TaskGraph::build(&config).unwrap();

    assert_eq!(graph.mode(), DispatchMode::Cyclic);
    assert_eq!(graph.slot_width(), Duration::from_millis(5));
    assert_eq!(
        graph.descriptor(TaskId::DigitalPoll).unwrap().period,
        Duration::from_millis(100)
    );
}

#[test]
fn per_task_overrides_apply() {
    let config = SystemConfig::from_json(
        r#"{"classify":{"rate_hz":6.0,"priority":7},"busy_work_iterations":10}"#,
    )
    .unwrap();
    let graph = TaskGraph::build(&config).unwrap();
    let d = graph.descriptor(TaskId::Classify).unwrap();
    assert_eq!(d.priority, 7);
    assert_eq!(d.period, cycle_period(6.0));
}

#[test]
fn cyclic_graph_rejects_tasks_faster_than_a_slot() {
    let doc = r#"{"dispatch":"Cyclic","slot_width_us":100000}"#;
    assert_eq!(
        SystemConfig::from_json(doc).err(),
        Some(Error::Config(ConfigFault::PeriodShorterThanSlot("watchdog")))
    );
}

#[test]
fn shared_resources_start_empty() {
    let graph = TaskGraph::build(&SystemConfig::default()).unwrap();
    assert!(graph.shared().history.is_empty());
    assert!(!graph.shared().window.is_pending());
}
