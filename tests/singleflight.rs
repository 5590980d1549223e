use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use futures::FutureExt;
use memoflight::{BoxDelegate, BoxFetchFuture, FetchError, Registry};
use tokio::time::{Duration, sleep};

fn row_scan(calls: Arc<AtomicUsize>) -> BoxDelegate<(), Vec<String>> {
    Box::new(move |_ctx: ()| -> BoxFetchFuture<Vec<String>> {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(50)).await;
            Ok(vec!["A".to_string(), "B".to_string()])
        }
        .boxed()
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_concurrent_callers_share_one_scan() {
    let registry: Registry<&str, (), Vec<String>> = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let registry = registry.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            registry.fetch("req-1", move || Ok(row_scan(calls)), ()).await
        }));
    }
    for handle in handles {
        let rows = handle.await.unwrap().unwrap();
        assert_eq!(rows, vec!["A".to_string(), "B".to_string()]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_attempt_is_retried_then_cached() {
    let registry: Registry<&str, (), &'static str> = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let delegate_calls = calls.clone();
    let make_delegate = move || -> BoxDelegate<(), &'static str> {
        let calls = delegate_calls.clone();
        Box::new(move |_ctx: ()| -> BoxFetchFuture<&'static str> {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(anyhow!("E1"))
                } else {
                    Ok("V")
                }
            }
            .boxed()
        })
    };

    let err = registry
        .fetch("req-2", || Ok(make_delegate()), ())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Fetch(_)));
    assert!(err.to_string().contains("E1"));

    let value = registry
        .fetch("req-2", || Ok(make_delegate()), ())
        .await
        .unwrap();
    assert_eq!(value, "V");

    let value = registry
        .fetch("req-2", || Ok(make_delegate()), ())
        .await
        .unwrap();
    assert_eq!(value, "V");

    // One failing attempt, one successful attempt, then cached.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn always_failing_key_fails_each_sequential_call() {
    let registry: Registry<&str, (), u32> = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for round in 1..=3 {
        let delegate_calls = calls.clone();
        let err = registry
            .fetch(
                "req-3",
                move || {
                    Ok(Box::new(move |_ctx: ()| -> BoxFetchFuture<u32> {
                        delegate_calls.fetch_add(1, Ordering::SeqCst);
                        async move { Err(anyhow!("still down")) }.boxed()
                    }) as BoxDelegate<(), u32>)
                },
                (),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Fetch(_)));
        assert_eq!(calls.load(Ordering::SeqCst), round);
    }
}

#[tokio::test]
async fn keys_do_not_share_delegates() {
    let registry: Registry<String, (), Vec<String>> = Registry::new();
    let calls_1 = Arc::new(AtomicUsize::new(0));
    let calls_2 = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let calls_1 = calls_1.clone();
        let calls_2 = calls_2.clone();
        registry
            .fetch("req-1".to_string(), move || Ok(row_scan(calls_1)), ())
            .await
            .unwrap();
        registry
            .fetch("req-2".to_string(), move || Ok(row_scan(calls_2)), ())
            .await
            .unwrap();
    }

    assert_eq!(calls_1.load(Ordering::SeqCst), 1);
    assert_eq!(calls_2.load(Ordering::SeqCst), 1);
}
