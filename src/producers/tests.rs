use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use super::*;
use crate::broker::message::{TOPIC_ACCEL, TOPIC_BUTTON, decode_accel};
use crate::broker::{Broker, Consumer, Message};
use crate::utils::error::{ProducerError, SourceError};

/// Button device replaying a fixed script, then failing.
struct Scripted(VecDeque<Result<i32, SourceError>>);

impl Scripted {
    fn new(values: &[i32]) -> Self {
        Self(values.iter().map(|v| Ok(*v)).collect())
    }
}

impl ButtonDevice for Scripted {
    fn read_value(&mut self) -> Result<i32, SourceError> {
        self.0.pop_front().unwrap_or_else(|| {
            Err(SourceError::InvalidReading {
                device: "scripted".to_string(),
                raw: String::new(),
            })
        })
    }
}

#[derive(Default)]
struct Collector {
    seen: Mutex<Vec<Message>>,
}

impl Consumer for Collector {
    fn on_message(&self, message: &Message) {
        self.seen.lock().unwrap().push(message.clone());
    }
}

impl Collector {
    fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_button_publishes_only_changes() {
    let mut button = Button::new(27, Scripted::new(&[1, 1, 0, 0, 1]));
    assert_eq!(button.topic(), TOPIC_BUTTON);
    assert_eq!(button.poll().unwrap().as_deref(), Some("27,1"));
    assert_eq!(button.poll().unwrap(), None);
    assert_eq!(button.poll().unwrap().as_deref(), Some("27,0"));
    assert_eq!(button.poll().unwrap(), None);
    assert_eq!(button.poll().unwrap().as_deref(), Some("27,1"));
    assert!(button.poll().is_err());
}

#[test]
fn test_simulated_button_presses_periodically() {
    let mut device = SimulatedButtonDevice::new(3);
    let values: Vec<i32> = (0..6).map(|_| device.read_value().unwrap()).collect();
    assert_eq!(values, vec![1, 1, 0, 1, 1, 0]);
}

#[test]
fn test_file_button_device_reads_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_gpio-btn");
    fs::write(&path, "0\n").unwrap();

    let mut device = FileButtonDevice::new(&path);
    assert_eq!(device.read_value().unwrap(), 0);

    fs::write(&path, "garbage").unwrap();
    assert!(matches!(
        device.read_value(),
        Err(SourceError::InvalidReading { raw, .. }) if raw == "garbage"
    ));

    fs::remove_file(&path).unwrap();
    assert!(matches!(device.read_value(), Err(SourceError::Io(_))));
}

#[test]
fn test_accelerometer_encodes_samples() {
    let mut accl = Accelerometer::new(SimulatedAccelDevice::default());
    let msg = accl.next_message().unwrap().unwrap();
    assert_eq!(msg.topic(), TOPIC_ACCEL);

    let (x, y, z) = decode_accel(msg.payload()).unwrap();
    assert_eq!((x, y), (0.0, 0.0));
    assert!((z - 1.0).abs() < 1e-12);
}

#[test]
fn test_simulated_accel_stays_near_one_g() {
    let mut device = SimulatedAccelDevice::new(0.37, 0.6);
    for _ in 0..100 {
        let (x, y, z) = device.read().unwrap().unwrap();
        let g = (x * x + y * y + z * z).sqrt();
        assert!((g - 1.0).abs() < 1e-9);
        assert!(x.abs() <= 0.6 && y.abs() <= 0.3);
    }
}

#[test]
fn test_producer_publishes_until_stopped() {
    let broker = Arc::new(Broker::new());
    let collector = Arc::new(Collector::default());
    broker.subscribe(TOPIC_ACCEL, &collector);

    let producer = Producer::spawn(
        "accl-test",
        broker.clone(),
        Accelerometer::new(SimulatedAccelDevice::default()),
        Duration::from_millis(1),
    )
    .unwrap();
    assert_eq!(producer.name(), "accl-test");

    assert!(wait_until(Duration::from_secs(5), || collector.len() >= 5));
    assert!(producer.is_running());
    producer.join().unwrap();

    let after = collector.len();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(collector.len(), after);
}

#[test]
fn test_producer_survives_device_errors() {
    struct Flaky {
        calls: Arc<AtomicUsize>,
    }

    impl ButtonDevice for Flaky {
        fn read_value(&mut self) -> Result<i32, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 0 {
                Err(std::io::Error::other("bus glitch").into())
            } else {
                Ok((n % 4 == 1) as i32)
            }
        }
    }

    let broker = Arc::new(Broker::new());
    let collector = Arc::new(Collector::default());
    broker.subscribe(TOPIC_BUTTON, &collector);
    let calls = Arc::new(AtomicUsize::new(0));

    let producer = Producer::spawn(
        "btn-test",
        broker.clone(),
        Button::new(27, Flaky {
            calls: calls.clone(),
        }),
        Duration::from_millis(1),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(5), || collector.len() >= 3));
    producer.join().unwrap();
    assert!(calls.load(Ordering::SeqCst) >= 6);
}

#[test]
fn test_stop_wakes_a_sleeping_producer() {
    let broker = Arc::new(Broker::new());
    let producer = Producer::spawn(
        "slow",
        broker,
        Accelerometer::new(SimulatedAccelDevice::default()),
        Duration::from_secs(3600),
    )
    .unwrap();

    let started = Instant::now();
    producer.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[test]
fn test_join_reports_panicked_thread() {
    struct Exploding;

    impl AccelDevice for Exploding {
        fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SourceError> {
            panic!("driver bug");
        }
    }

    let producer = Producer::spawn(
        "exploding",
        Arc::new(Broker::new()),
        Accelerometer::new(Exploding),
        Duration::from_millis(1),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(5), || !producer.is_running()));
    assert!(matches!(
        producer.join(),
        Err(ProducerError::Panicked { name }) if name == "exploding"
    ));
}
