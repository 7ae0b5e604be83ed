use ferrous_dnsmasq_domain::config::LogWatchConfig;
use ferrous_dnsmasq_domain::{DomainError, Query};
use ferrous_dnsmasq_infrastructure::dnsmasq::DnsmasqLogWatcher;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const FORWARDED_LOG: &str = "
Feb  4 18:18:18 dnsmasq[1]: 1 127.0.0.1/123 query[A] google.com from 127.0.0.1
Feb  4 18:18:18 dnsmasq[1]: 1 127.0.0.1/123 forwarded google.com to 1.1.1.1
Feb  4 18:18:18 dnsmasq[1]: 1 127.0.0.1/123 reply google.com is 8.8.8.8
";

const CACHED_LOG: &str = "
Feb  4 19:19:19 dnsmasq[1]: 2 192.168.1.1/321 query[A] cf-dns from 192.168.1.1
Feb  4 19:19:19 dnsmasq[1]: 2 192.168.1.1/321 cached cf-dns is 1.1.1.1
Feb  4 19:19:19 dnsmasq[1]: 2 192.168.1.1/321 cached cf-dns is 1.0.0.1
";

const NOISE_LOG: &str = "
Feb  4 19:19:20 dnsmasq[1]: started, version 2.90 cachesize 150
Feb  4 19:19:20 dnsmasq[1]: 3 10.0.0.7/999 query[PTR] 1.0.0.10.in-addr.arpa from 10.0.0.7
Feb  4 19:19:20 dnsmasq[1]: 3 10.0.0.7/999 config 1.0.0.10.in-addr.arpa is NXDOMAIN
";

fn spawn_watcher(
    pipe_path: &Path,
    timeout_ms: u64,
    shutdown: CancellationToken,
) -> (JoinHandle<Result<(), DomainError>>, mpsc::Receiver<Query>) {
    let config = LogWatchConfig {
        pipe_path: pipe_path.to_string_lossy().into_owned(),
        query_timeout_ms: timeout_ms,
        ..LogWatchConfig::default()
    };
    let (tx, rx) = mpsc::channel(1);
    let watcher = DnsmasqLogWatcher::new(&config);
    let handle = tokio::spawn(async move { watcher.watch(shutdown, tx).await });
    (handle, rx)
}

/// Opens the writing end once the watcher created and opened the FIFO.
async fn open_writer(path: &Path) -> pipe::Sender {
    for _ in 0..200 {
        if let Ok(sender) = pipe::OpenOptions::new().open_sender(path) {
            return sender;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("log pipe {} never became writable", path.display());
}

async fn next_query(rx: &mut mpsc::Receiver<Query>) -> Option<Query> {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for query")
}

#[tokio::test]
async fn test_watch_logs_over_fifo() {
    let dir = tempfile::tempdir().unwrap();
    let pipe_path = dir.path().join("log-pipe");
    let shutdown = CancellationToken::new();
    let (handle, mut rx) = spawn_watcher(&pipe_path, 100, shutdown.clone());

    let mut writer = open_writer(&pipe_path).await;

    writer.write_all(FORWARDED_LOG.as_bytes()).await.unwrap();
    let query = next_query(&mut rx).await.unwrap();
    assert_eq!(query.domain, "google.com");
    assert_eq!(query.made_by, "127.0.0.1");
    assert_eq!(query.queried, vec!["1.1.1.1"]);
    assert_eq!(query.result, vec!["8.8.8.8"]);

    writer.write_all(CACHED_LOG.as_bytes()).await.unwrap();
    let query = next_query(&mut rx).await.unwrap();
    assert_eq!(query.domain, "cf-dns");
    assert_eq!(query.made_by, "192.168.1.1");
    assert!(query.queried.is_empty());
    assert_eq!(query.result, vec!["1.1.1.1", "1.0.0.1"]);

    shutdown.cancel();
    assert!(next_query(&mut rx).await.is_none());
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_unrelated_lines_produce_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pipe_path = dir.path().join("log-pipe");
    let shutdown = CancellationToken::new();
    let (handle, mut rx) = spawn_watcher(&pipe_path, 50, shutdown.clone());

    let mut writer = open_writer(&pipe_path).await;
    writer.write_all(NOISE_LOG.as_bytes()).await.unwrap();
    writer.write_all(FORWARDED_LOG.as_bytes()).await.unwrap();

    let query = next_query(&mut rx).await.unwrap();
    assert_eq!(query.domain, "google.com");

    sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());

    shutdown.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_writer_restart_does_not_end_watch() {
    let dir = tempfile::tempdir().unwrap();
    let pipe_path = dir.path().join("log-pipe");
    let shutdown = CancellationToken::new();
    let (handle, mut rx) = spawn_watcher(&pipe_path, 50, shutdown.clone());

    let mut writer = open_writer(&pipe_path).await;
    writer.write_all(FORWARDED_LOG.as_bytes()).await.unwrap();
    drop(writer);
    next_query(&mut rx).await.unwrap();

    let mut writer = open_writer(&pipe_path).await;
    writer.write_all(CACHED_LOG.as_bytes()).await.unwrap();
    let query = next_query(&mut rx).await.unwrap();
    assert_eq!(query.domain, "cf-dns");
    assert!(!handle.is_finished());

    shutdown.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_flushes_in_flight_queries() {
    let dir = tempfile::tempdir().unwrap();
    let pipe_path = dir.path().join("log-pipe");
    let shutdown = CancellationToken::new();
    let (handle, mut rx) = spawn_watcher(&pipe_path, 3_600_000, shutdown.clone());

    let mut writer = open_writer(&pipe_path).await;
    writer.write_all(CACHED_LOG.as_bytes()).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    shutdown.cancel();
    let query = next_query(&mut rx).await.unwrap();
    assert_eq!(query.result, vec!["1.1.1.1", "1.0.0.1"]);
    assert!(next_query(&mut rx).await.is_none());
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_existing_regular_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-pipe");
    std::fs::write(&path, b"").unwrap();

    let (handle, mut rx) = spawn_watcher(&path, 50, CancellationToken::new());

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(DomainError::LogSourceUnavailable(_))));
    assert!(rx.recv().await.is_none());
}
