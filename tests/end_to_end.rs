use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use balance_bus::broker::message::{TOPIC_ACCEL, TOPIC_BOUNDARY, TOPIC_BUTTON};
use balance_bus::broker::{Broker, Consumer, Message};
use balance_bus::config::Settings;
use balance_bus::consumers::{FrameLog, GameControl};
use balance_bus::producers::{
    Accelerometer, Button, Producer, SimulatedAccelDevice, SimulatedButtonDevice,
};

struct Tally(std::sync::atomic::AtomicUsize);

impl Consumer for Tally {
    fn on_message(&self, _message: &Message) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[test]
fn integration_producers_drive_game() {
    let broker = Arc::new(Broker::new());
    let frames = Arc::new(FrameLog::default());
    let game = Arc::new(GameControl::new(
        broker.clone(),
        frames.clone(),
        Settings::default().game,
    ));
    for topic in [TOPIC_ACCEL, TOPIC_BUTTON, TOPIC_BOUNDARY] {
        broker.subscribe(topic, &game);
    }
    let buttons = Arc::new(Tally(Default::default()));
    broker.subscribe(TOPIC_BUTTON, &buttons);

    let accl = Producer::spawn(
        "accl",
        broker.clone(),
        Accelerometer::new(SimulatedAccelDevice::new(0.05, 0.7)),
        Duration::from_millis(1),
    )
    .unwrap();
    let btn = Producer::spawn(
        "btn",
        broker.clone(),
        Button::new(27, SimulatedButtonDevice::new(4)),
        Duration::from_millis(1),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while frames.frames().len() < 200 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    accl.join().unwrap();
    btn.join().unwrap();

    assert!(frames.frames().len() >= 200);
    assert!(buttons.0.load(std::sync::atomic::Ordering::SeqCst) >= 2);

    let state = game.state();
    assert!((0..=120).contains(&state.ball_x));
    assert!((0..=24).contains(&state.ball_y));
}

#[test]
fn integration_consumer_dropped_mid_run() {
    let broker = Arc::new(Broker::new());
    let frames = Arc::new(FrameLog::default());
    let game = Arc::new(GameControl::new(
        broker.clone(),
        frames.clone(),
        Settings::default().game,
    ));
    broker.subscribe(TOPIC_ACCEL, &game);

    let accl = Producer::spawn(
        "accl",
        broker.clone(),
        Accelerometer::new(SimulatedAccelDevice::default()),
        Duration::from_millis(1),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while frames.frames().len() < 10 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    // the producer keeps publishing into a topic whose only consumer is gone
    drop(game);
    thread::sleep(Duration::from_millis(20));
    let frozen = frames.frames().len();
    thread::sleep(Duration::from_millis(20));

    accl.join().unwrap();
    assert_eq!(frames.frames().len(), frozen);
    assert!(broker.has_topic(TOPIC_ACCEL));
}
