//! Cyclic executive driven end to end against the mock board.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use sensor_monitor::app::ports::Level;
use sensor_monitor::config::{DispatchMode, SystemConfig};
use sensor_monitor::diagnostics::Diagnostics;
use sensor_monitor::error::{ConfigFault, Error};
use sensor_monitor::graph::TaskGraph;
use sensor_monitor::pins;
use sensor_monitor::scheduler::CyclicExecutive;
use sensor_monitor::tasks::TaskId;

use crate::mock_hw::{MockBoard, MockSink};

fn cyclic_config() -> SystemConfig {
    SystemConfig {
        dispatch: DispatchMode::Cyclic,
        ..SystemConfig::default()
    }
}

fn executive(config: &SystemConfig) -> (CyclicExecutive, Arc<Diagnostics>) {
    let diag = Arc::new(Diagnostics::new());
    let graph = TaskGraph::build(config).unwrap();
    (CyclicExecutive::new(graph, Arc::clone(&diag)).unwrap(), diag)
}

fn tick_n(exec: &mut CyclicExecutive, n: u64, hw: &mut MockBoard, sink: &mut MockSink) {
    for _ in 0..n {
        exec.tick(hw, sink).unwrap();
    }
}

#[test]
fn saturated_input_raises_the_alarm_led() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();
    hw.set_analogue(4_000);

    // Tick 0: one real sample in the window, average 1000 -> nominal.
    tick_n(&mut exec, 1, &mut hw, &mut sink);
    assert_eq!(hw.output(pins::ERROR_CODE_LED), Some(Level::Low));

    // Classifier and visualiser next run at tick 83; the window has been
    // full of 4000s since tick 30.
    tick_n(&mut exec, 83, &mut hw, &mut sink);
    assert_eq!(
        hw.writes_to(pins::ERROR_CODE_LED),
        [Level::Low, Level::High]
    );
}

#[test]
fn low_input_never_alarms() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();
    hw.set_analogue(125);

    tick_n(&mut exec, 400, &mut hw, &mut sink);
    let led = hw.writes_to(pins::ERROR_CODE_LED);
    assert!(!led.is_empty());
    assert!(led.iter().all(|l| *l == Level::Low));
}

#[test]
fn first_tick_logs_a_full_record() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();
    hw.set_digital(pins::DIGITAL_INPUT, true);
    hw.set_pulse_us(500);
    hw.set_analogue(400);

    tick_n(&mut exec, 1, &mut hw, &mut sink);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert!(r.digital_input_state);
    assert!((r.square_wave_frequency - 1_000.0).abs() < 1e-6);
    assert_eq!(r.filtered_analogue_signal, 100.0);
    assert_eq!(r.recent_averages.as_slice(), &[100.0]);
}

#[test]
fn logger_runs_every_five_seconds_of_slots() {
    let (mut exec, diag) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();

    // 0.2 Hz on 4 ms slots = every 1250 ticks.
    tick_n(&mut exec, 2_501, &mut hw, &mut sink);
    assert_eq!(sink.records().len(), 3);
    assert_eq!(diag.snapshot().task(TaskId::Logger).runs, 3);
}

#[test]
fn monitor_pin_brackets_the_digital_poll() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();

    tick_n(&mut exec, 51, &mut hw, &mut sink);
    // 5 Hz = 50 slots: ticks 0 and 50.
    assert_eq!(
        hw.writes_to(pins::TIMING_MONITOR),
        [Level::High, Level::Low, Level::High, Level::Low]
    );
}

#[test]
fn watchdog_pulse_uses_configured_width() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();

    tick_n(&mut exec, 1, &mut hw, &mut sink);
    assert_eq!(hw.writes_to(pins::WATCHDOG_OUTPUT), [Level::High, Level::Low]);
    assert_eq!(hw.state().delayed_us, 50);
}

#[test]
fn paced_ticks_hold_the_slot_grid() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();

    let start = Instant::now();
    exec.run_ticks(5, &mut hw, &mut sink).unwrap();
    assert_eq!(exec.tick_count(), 5);
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn run_stops_when_flag_is_raised() {
    let (mut exec, _) = executive(&cyclic_config());
    let mut hw = MockBoard::new();
    let mut sink = MockSink::new();

    let stop = Arc::new(AtomicBool::new(false));
    let stopper = {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(40));
            stop.store(true, Ordering::Release);
        })
    };

    exec.run(&mut hw, &mut sink, &stop).unwrap();
    stopper.join().unwrap();
    assert!(exec.tick_count() >= 1);
}

#[test]
fn preemptive_graph_never_reaches_the_slot_loop() {
    // Non-zero waits and a sub-slot filter period are legal for threads
    // but would block a tick for many slots.
    let mut config = SystemConfig::default();
    config.filter.rate_hz = 250.0;
    let graph = TaskGraph::build(&config).unwrap();
    assert_eq!(graph.mode(), DispatchMode::Preemptive);

    let diag = Arc::new(Diagnostics::new());
    let err = CyclicExecutive::new(graph, Arc::clone(&diag)).err().unwrap();
    assert!(matches!(
        err,
        Error::Config(ConfigFault::WrongDispatchMode { .. })
    ));
    assert_eq!(diag.snapshot().task(TaskId::Filter).runs, 0);
}
