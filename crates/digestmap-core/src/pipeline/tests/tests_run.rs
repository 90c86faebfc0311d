//! Tests for a full fingerprint run

#![allow(clippy::expect_used)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::digest::digest_file;
use crate::error::DigestError;
use crate::pipeline::{digest_root, Aggregator, FileResult, PipelineConfig, WorkerPool};

fn expected_hex(path: &Path) -> String {
    digest_file(path).expect("digest failed").to_hex()
}

#[cfg(unix)]
/// Queue paths for the workers, checking cancellation before each send
async fn queue_until_cancelled(
    paths: Vec<PathBuf>,
    tx: mpsc::Sender<PathBuf>,
    cancel: CancellationToken,
) -> Result<usize, DigestError> {
    let mut sent = 0;
    for path in paths {
        if cancel.is_cancelled() {
            return Err(DigestError::Cancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DigestError::Cancelled),
            queued = tx.send(path) => {
                if queued.is_err() {
                    return Err(DigestError::Cancelled);
                }
            }
        }
        sent += 1;
    }
    Ok(sent)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_run_keys_by_relative_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("a.txt"), "0123456789").expect("Failed to write file");
    fs::write(temp_dir.path().join("b.txt"), vec![0u8; 1024]).expect("Failed to write file");

    let map = digest_root(temp_dir.path(), &PipelineConfig::default())
        .await
        .expect("run failed");

    assert_eq!(map.len(), 2);
    assert_eq!(map["a.txt"], "dd98102b864fab43af78209b71094e17");
    assert_eq!(map["b.txt"], "54a5b0e64bbacc2af4b3611b90080518");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_file_run_keys_by_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = temp_dir.path().join("solo.bin");
    fs::write(&file, b"solo").expect("Failed to write file");

    let map = digest_root(&file, &PipelineConfig::default())
        .await
        .expect("run failed");

    let key = file.to_string_lossy().into_owned();
    assert_eq!(map.len(), 1);
    assert_eq!(map[&key], expected_hex(&file));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subdirectory_contents_are_ignored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested).expect("Failed to create dir");
    fs::write(nested.join("deep.txt"), "deep").expect("Failed to write file");
    fs::write(temp_dir.path().join("top.txt"), "top").expect("Failed to write file");

    let map = digest_root(temp_dir.path(), &PipelineConfig::default())
        .await
        .expect("run failed");

    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["top.txt"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_many_files_with_one_worker() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for i in 0..25 {
        fs::write(temp_dir.path().join(format!("{i}.dat")), vec![i as u8; 100 * i])
            .expect("Failed to write file");
    }

    let config = PipelineConfig::new().with_workers(1);
    let map = digest_root(temp_dir.path(), &config)
        .await
        .expect("run failed");

    assert_eq!(map.len(), 25);
    for (name, hex) in &map {
        assert_eq!(hex, &expected_hex(&temp_dir.path().join(name)));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_root_fails_with_stat() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let err = digest_root(&temp_dir.path().join("gone"), &PipelineConfig::default())
        .await
        .expect_err("missing root should fail");

    assert!(matches!(err, DigestError::Stat { .. }));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_permission_denied_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("a.txt"), "0123456789").expect("Failed to write file");
    let locked = temp_dir.path().join("b.txt");
    fs::write(&locked, "secret").expect("Failed to write file");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
        .expect("Failed to restrict permissions");

    // Privileged users ignore file modes
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let map = digest_root(temp_dir.path(), &PipelineConfig::default())
        .await
        .expect("permission errors are not fatal");

    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a.txt"]);
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unlistable_root_fails_with_enumerate() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().join("sealed");
    fs::create_dir(&root).expect("Failed to create dir");
    fs::write(root.join("a.txt"), "a").expect("Failed to write file");
    fs::set_permissions(&root, fs::Permissions::from_mode(0o000))
        .expect("Failed to restrict permissions");

    if fs::read_dir(&root).is_ok() {
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755))
            .expect("Failed to restore permissions");
        return;
    }

    let result = digest_root(&root, &PipelineConfig::default()).await;
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755))
        .expect("Failed to restore permissions");

    assert!(matches!(result, Err(DigestError::Enumerate { .. })));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_read_failure_cancels_run_and_stops_sourcing() {
    const FILLER: usize = 1000;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().to_path_buf();
    fs::write(root.join("a.txt"), "0123456789").expect("Failed to write file");
    // Opening a directory succeeds; reading it fails with EISDIR
    fs::create_dir(root.join("c.txt")).expect("Failed to create dir");

    let mut paths = vec![root.join("a.txt"), root.join("c.txt")];
    for i in 0..FILLER {
        let path = root.join(format!("filler-{i}.txt"));
        fs::write(&path, format!("filler {i}")).expect("Failed to write file");
        paths.push(path);
    }

    let cancel = CancellationToken::new();
    let (path_tx, path_rx) = mpsc::channel(1);
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    let producer = tokio::spawn(queue_until_cancelled(paths, path_tx, cancel.clone()));
    let pool = WorkerPool::spawn(2, Arc::new(root), path_rx, result_tx, &cancel);

    let outcome = Aggregator::new(cancel.clone()).drain(result_rx).await;
    let emitted = pool.join().await.expect("pool failed");
    let sourced = producer.await.expect("producer panicked");

    assert!(matches!(outcome, Err(DigestError::Read { .. })));
    assert!(cancel.is_cancelled());
    assert!(matches!(sourced, Err(DigestError::Cancelled)));
    assert!(
        emitted < FILLER / 10,
        "workers kept emitting after cancellation: {emitted}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_permission_denied_result_does_not_stop_pipeline() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().to_path_buf();
    fs::write(root.join("a.txt"), "0123456789").expect("Failed to write file");

    let cancel = CancellationToken::new();
    let (path_tx, path_rx) = mpsc::channel(1);
    let (result_tx, result_rx) = mpsc::unbounded_channel();
    let denied_tx = result_tx.clone();

    let pool = WorkerPool::spawn(2, Arc::new(root.clone()), path_rx, result_tx, &cancel);

    path_tx
        .send(root.join("a.txt"))
        .await
        .expect("Failed to queue path");
    drop(path_tx);

    // Stands in for a worker that could not open b.txt
    denied_tx
        .send(FileResult::new(
            "b.txt",
            Err(DigestError::Open {
                path: root.join("b.txt"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
        ))
        .expect("aggregator gone");
    drop(denied_tx);

    let map = Aggregator::new(cancel.clone())
        .drain(result_rx)
        .await
        .expect("permission errors are not fatal");
    pool.join().await.expect("pool failed");

    assert!(!cancel.is_cancelled());
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a.txt"]);
    assert_eq!(map["a.txt"], "dd98102b864fab43af78209b71094e17");
}
