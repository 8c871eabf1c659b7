use super::*;
use std::time::Instant;

#[test]
fn next_and_previous_wrap() {
    let clock = PreviewClock::new(3);
    assert_eq!(clock.next(), 1);
    assert_eq!(clock.next(), 2);
    assert_eq!(clock.next(), 0);
    assert_eq!(clock.previous(), 2);
    assert_eq!(clock.previous(), 1);
}

#[test]
fn empty_clock_stays_at_zero() {
    let clock = PreviewClock::new(0);
    assert_eq!(clock.next(), 0);
    assert_eq!(clock.previous(), 0);
    assert!(clock.set_index(0).is_err());
}

#[test]
fn set_count_clamps_index() {
    let clock = PreviewClock::new(5);
    clock.set_index(4).unwrap();
    clock.set_count(3);
    assert_eq!(clock.index(), 2);
    clock.set_count(0);
    assert_eq!(clock.index(), 0);
}

#[test]
fn play_advances_and_pause_stops() {
    let mut clock = PreviewClock::new(4);
    let (tx, rx) = mpsc::channel();
    clock
        .play(
            Duration::from_millis(10),
            Some(Box::new(move |i| {
                let _ = tx.send(i);
            })),
        )
        .unwrap();
    assert!(clock.is_playing());

    let ticks: Vec<usize> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    assert_eq!(ticks, vec![1, 2, 3]);

    clock.pause();
    assert!(!clock.is_playing());
    let frozen = clock.index();
    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(clock.index(), frozen);
}

#[test]
fn pause_is_immediate_with_long_period() {
    let mut clock = PreviewClock::new(2);
    clock.play(Duration::from_secs(60), None).unwrap();
    let start = Instant::now();
    clock.pause();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(clock.index(), 0);
}

#[test]
fn zero_period_is_rejected() {
    let mut clock = PreviewClock::new(2);
    assert!(clock.play(Duration::ZERO, None).is_err());
}
