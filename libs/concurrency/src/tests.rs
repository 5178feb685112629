use crate::{poll, testonly, Group};
use assert_matches::assert_matches;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

#[test]
fn group_waits_for_all_tasks_after_a_failure() {
    testonly::init_test_logging();
    testonly::with_runtimes(|| async {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut group = Group::new();
        for i in 0..5u64 {
            let finished = finished.clone();
            group.spawn(async move {
                if i == 2 {
                    anyhow::bail!("task {i} failed");
                }
                // Siblings of the failing task take longer than it does.
                tokio::time::sleep(Duration::from_millis(20 * (i + 1))).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(i)
            });
        }
        let joined = group.wait().await;
        assert_eq!(finished.load(Ordering::SeqCst), 4);
        assert_eq!(joined.first_failed(), Some(2));
        assert_eq!(joined.succeeded(), 4);
        let (values, err) = joined.into_parts();
        assert_eq!(values, vec![Some(0), Some(1), None, Some(3), Some(4)]);
        assert_eq!(err.unwrap().to_string(), "task 2 failed");
    });
}

#[tokio::test]
async fn group_reports_error_which_happened_first() {
    let mut group = Group::<()>::new();
    group.spawn(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        anyhow::bail!("slow")
    });
    group.spawn(async { anyhow::bail!("fast") });
    let err = group.wait().await.into_result().unwrap_err();
    assert_eq!(err.to_string(), "fast");
}

#[tokio::test]
async fn group_returns_values_in_spawn_order() {
    let mut group = Group::new();
    for i in 0..4u64 {
        group.spawn(async move {
            tokio::time::sleep(Duration::from_millis(10 * (4 - i))).await;
            Ok(i * 10)
        });
    }
    assert_eq!(group.len(), 4);
    assert_eq!(group.wait().await.into_result().unwrap(), vec![0, 10, 20, 30]);
}

#[tokio::test]
async fn empty_group_succeeds() {
    let joined = Group::<u8>::new().wait().await;
    assert_eq!(joined.first_failed(), None);
    assert!(joined.into_result().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn poll_returns_first_ready_value() {
    let calls = AtomicUsize::new(0);
    let got = poll(Duration::from_secs(1), Duration::from_secs(60), || async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        match n {
            0 => anyhow::bail!("node not up yet"),
            1 | 2 => Ok(None),
            _ => Ok(Some(n)),
        }
    })
    .await
    .unwrap();
    assert_eq!(got, 3);
}

#[tokio::test(start_paused = true)]
async fn poll_times_out_with_last_error() {
    let res: Result<(), _> = poll(Duration::from_secs(1), Duration::from_secs(5), || async {
        anyhow::bail!("connection refused")
    })
    .await;
    let err = res.unwrap_err();
    assert_eq!(err.timeout, Duration::from_secs(5));
    assert_matches!(err.last_error.as_deref(), Some("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn poll_accepts_zero_interval() {
    let calls = AtomicUsize::new(0);
    let got = poll(Duration::ZERO, Duration::from_secs(1), || async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Ok((n == 3).then_some(n))
    })
    .await
    .unwrap();
    assert_eq!(got, 3);
}

#[tokio::test(start_paused = true)]
async fn dropped_group_keeps_tasks_running() {
    let finished = Arc::new(AtomicUsize::new(0));
    let mut group = Group::<()>::new();
    for _ in 0..3 {
        let finished = finished.clone();
        group.spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }
    drop(group);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}
