// tests/mining_flow.rs
use dero_miner_rs::miner::work::WORK_SIZE;
use dero_miner_rs::network::SubmitMessage;
use dero_miner_rs::{
    Blake2Hasher, Difficulty, FeedConfig, JobFeed, JobStore, MiningSession, PowHasher, Scheduler,
    WorkerSettings,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tungstenite::protocol::Message;
use url::Url;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_workers_submit_through_feed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (submitted_tx, mut submitted_rx) = mpsc::unbounded_channel::<SubmitMessage>();

    let mut blob = [0u8; WORK_SIZE];
    blob[0] = 0x21; // version nibble 1, upper bits ignored
    let job = json!({
        "jobid": "flow-1",
        "blockhashing_blob": hex::encode(blob),
        "difficulty": "1000",
        "difficultyuint64": 1000,
        "height": 88,
    })
    .to_string();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(job.into())).await.unwrap();
        // Drain until the client leaves so no writer ever blocks on a full socket.
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                if let Ok(submit) = serde_json::from_str::<SubmitMessage>(text.as_str()) {
                    let _ = submitted_tx.send(submit);
                }
            }
        }
    });

    let session = Arc::new(MiningSession::new());
    let store = Arc::new(JobStore::new());
    let feed = Arc::new(JobFeed::new(
        FeedConfig {
            url: Url::parse(&format!("ws://{}/ws/dero1qflow", addr)).unwrap(),
            accept_invalid_certs: false,
            reconnect_delay: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(5),
        },
        store.clone(),
        session.clone(),
    ));
    let scheduler = Scheduler::new(
        session.clone(),
        store,
        Arc::new(Blake2Hasher),
        Arc::new(feed.submitter(tokio::runtime::Handle::current())),
        WorkerSettings {
            retry_delay: Duration::from_millis(20),
            idle_delay: Duration::from_millis(5),
            pin_threads: false,
        },
    );

    session.activate();
    let running = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.run().await })
    };
    scheduler.start(2).unwrap();

    let difficulty: Difficulty = "1000".parse().unwrap();
    let mut seen_workers = HashSet::new();
    let collected = tokio::time::timeout(Duration::from_secs(10), async {
        while seen_workers.len() < 2 {
            let submit = submitted_rx.recv().await.expect("server ended early");
            assert_eq!(submit.job_id, "flow-1");

            // The submitted buffer must reproduce an accepted digest.
            let bytes = hex::decode(&submit.blob).unwrap();
            assert_eq!(bytes.len(), WORK_SIZE);
            assert_eq!(bytes[..36], blob[..36]);
            let digest = Blake2Hasher.hash(&bytes);
            assert!(difficulty.accepts(&digest));

            seen_workers.insert(bytes[WORK_SIZE - 1]);
        }
    })
    .await;

    session.deactivate();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();
    tokio::task::spawn_blocking(move || scheduler.join())
        .await
        .unwrap()
        .unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(2), server).await;

    assert!(collected.is_ok(), "both workers should submit solutions");
    assert_eq!(seen_workers, HashSet::from([0u8, 1u8]));
}
