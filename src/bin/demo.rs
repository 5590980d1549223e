use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use memoflight::{BoxDelegate, BoxFetchFuture, Registry};
use tokio::time::{Duration, sleep};

// ---------- Example usage ----------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry: Registry<String, (), Vec<String>> = Registry::new();
    let scans = Arc::new(AtomicUsize::new(0));

    // Five concurrent callers for the same request id share a single scan.
    let mut handles = Vec::new();
    for caller in 0..5 {
        let registry = registry.clone();
        let scans = scans.clone();
        handles.push(tokio::spawn(async move {
            let rows = registry
                .fetch(
                    "req-1".to_string(),
                    move || {
                        Ok(Box::new(move |_ctx: ()| -> BoxFetchFuture<Vec<String>> {
                            let scans = scans.clone();
                            async move {
                                scans.fetch_add(1, Ordering::SeqCst);
                                sleep(Duration::from_millis(200)).await;
                                Ok(vec!["A".to_string(), "B".to_string()])
                            }
                            .boxed()
                        }) as BoxDelegate<(), Vec<String>>)
                    },
                    (),
                )
                .await;
            println!("caller {} got {:?}", caller, rows);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("backend scans: {}", scans.load(Ordering::SeqCst));
}
