use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use shared::error::RemoteError;
use tokio::sync::watch;

use super::{execute, RetryPolicy};
use crate::outcome::ErrorKind;

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(16),
        jitter: false,
    }
}

fn cancel_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

#[test]
fn backoff_doubles_and_caps() {
    let policy = policy(7);
    let delays: Vec<u64> = (1..=6)
        .map(|attempt| policy.backoff_delay(attempt).as_secs())
        .collect();
    assert_eq!(delays, vec![1, 2, 4, 8, 16, 16]);
}

#[tokio::test(start_paused = true)]
async fn success_returns_immediately() {
    let calls = AtomicU32::new(0);
    let (_tx, mut cancel) = cancel_channel();

    let result = execute(
        || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, RemoteError>(42)
        },
        &policy(5),
        None,
        &mut cancel,
    )
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_exhausts_the_attempt_budget() {
    let calls = AtomicU32::new(0);
    let (_tx, mut cancel) = cancel_channel();

    let result: Result<(), _> = execute(
        || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::new("connection reset"))
        },
        &policy(4),
        None,
        &mut cancel,
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(result.unwrap_err().kind, ErrorKind::Transient);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_failure_short_circuits() {
    let calls = AtomicU32::new(0);
    let (_tx, mut cancel) = cancel_channel();

    let result: Result<(), _> = execute(
        || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::with_status("permission denied", 403))
        },
        &policy(5),
        None,
        &mut cancel,
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.unwrap_err().kind, ErrorKind::Permission);
}

#[tokio::test(start_paused = true)]
async fn observed_delays_follow_the_exponential_sequence() {
    let delays = Mutex::new(Vec::new());
    let (_tx, mut cancel) = cancel_channel();

    let on_retry = |_attempt: u32, _outcome: &crate::outcome::Outcome, delay: Duration| {
        delays.lock().unwrap().push(delay.as_secs());
    };

    let _: Result<(), _> = execute(
        || async { Err(RemoteError::new("temporary failure")) },
        &policy(7),
        Some(&on_retry),
        &mut cancel,
    )
    .await;

    assert_eq!(*delays.lock().unwrap(), vec![1, 2, 4, 8, 16, 16]);
}

#[tokio::test(start_paused = true)]
async fn server_directed_delay_overrides_backoff() {
    let delays = Mutex::new(Vec::new());
    let (_tx, mut cancel) = cancel_channel();

    let on_retry = |_attempt: u32, _outcome: &crate::outcome::Outcome, delay: Duration| {
        delays.lock().unwrap().push(delay.as_secs());
    };

    let _: Result<(), _> = execute(
        || async { Err(RemoteError::new("rate limit, retry after 30 seconds")) },
        &policy(2),
        Some(&on_retry),
        &mut cancel,
    )
    .await;

    assert_eq!(*delays.lock().unwrap(), vec![30]);
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_a_wait_stops_further_attempts() {
    let calls = AtomicU32::new(0);
    let (tx, mut cancel) = cancel_channel();

    let mut long_waits = policy(5);
    long_waits.base_delay = Duration::from_secs(60);
    long_waits.max_delay = Duration::from_secs(60);

    let run = execute(
        || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(RemoteError::new("timeout"))
        },
        &long_waits,
        None,
        &mut cancel,
    );
    let canceller = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
    };

    let (result, ()) = tokio::join!(run, canceller);

    assert_eq!(result.unwrap_err().kind, ErrorKind::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_means_no_attempt_at_all() {
    let calls = AtomicU32::new(0);
    let (tx, mut cancel) = cancel_channel();
    tx.send(true).unwrap();

    let result: Result<(), _> = execute(
        || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        &policy(5),
        None,
        &mut cancel,
    )
    .await;

    assert_eq!(result.unwrap_err().kind, ErrorKind::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn jitter_stays_within_ten_percent() {
    let delays = Mutex::new(Vec::new());
    let (_tx, mut cancel) = cancel_channel();

    let mut jittered = policy(2);
    jittered.jitter = true;

    let on_retry = |_attempt: u32, _outcome: &crate::outcome::Outcome, delay: Duration| {
        delays.lock().unwrap().push(delay);
    };

    let _: Result<(), _> = execute(
        || async { Err(RemoteError::new("network glitch")) },
        &jittered,
        Some(&on_retry),
        &mut cancel,
    )
    .await;

    let observed = delays.lock().unwrap()[0];
    assert!(observed >= Duration::from_secs(1));
    assert!(observed <= Duration::from_millis(1100));
}
