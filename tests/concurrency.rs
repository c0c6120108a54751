use std::sync::Arc;
use std::time::Duration;

use rmqtt_peak::{ManualClock, PeakValue};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_between_tasks() {
    let v = Arc::new(PeakValue::new(Duration::from_secs(60), 0i64));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let v = v.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..1000 {
                v.add(1);
                let (cur, min, max) = v.get();
                assert!(min <= cur && cur <= max);
                v.sub(1);
                tokio::task::yield_now().await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let (cur, min, max) = v.get();
    assert_eq!(cur, 0);
    assert_eq!(min, 0);
    assert!((1..=8).contains(&max));
}

#[test]
fn writers_and_readers_on_threads() {
    let clock = ManualClock::new(1 << 40);
    let v = Arc::new(PeakValue::with_clock(Duration::from_secs(1), 0u64, clock.clone()).unwrap());

    std::thread::scope(|s| {
        for _ in 0..4 {
            let v = v.clone();
            s.spawn(move || {
                for _ in 0..10_000 {
                    v.add(1);
                }
            });
        }
        for _ in 0..2 {
            let v = v.clone();
            let clock = clock.clone();
            s.spawn(move || {
                for _ in 0..1000 {
                    clock.advance(Duration::from_micros(10));
                    let (cur, min, max) = v.get();
                    assert!(min <= cur && cur <= max);
                }
            });
        }
    });

    // 20ms of manual time passed, well inside the window
    assert_eq!(v.get(), (40_000, 0, 40_000));
}
