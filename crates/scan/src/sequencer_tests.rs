use super::*;

use std::{
    fs::{create_dir, write},
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::fingerprint::digest_bytes;

fn scanner(workers: usize) -> Scanner {
    Scanner::new(Arc::new(WorkerPool::new(workers).expect("start pool")))
}

fn names(records: &[FileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn digest_of<'a>(records: &'a [FileRecord], name: &str) -> &'a str {
    records
        .iter()
        .find(|r| r.name == name)
        .and_then(|r| r.digest.as_deref())
        .expect("record with digest")
}

/// Sleeps before hashing one chosen file and logs completion order.
struct DelayFirst {
    slow_name: &'static str,
    delay: Duration,
    completed: Mutex<Vec<String>>,
}

impl Fingerprint for DelayFirst {
    fn fingerprint(&self, path: &Path) -> Option<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name == self.slow_name {
            thread::sleep(self.delay);
        }
        let digest = ContentFingerprint.fingerprint(path);
        self.completed
            .lock()
            .expect("completion log")
            .push(name);
        digest
    }
}

/// Counts how many fingerprints were actually computed.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl Fingerprint for Counting {
    fn fingerprint(&self, path: &Path) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ContentFingerprint.fingerprint(path)
    }
}

/// Deletes the file just before reading it, as a concurrent writer might.
struct VanishBeforeRead;

impl Fingerprint for VanishBeforeRead {
    fn fingerprint(&self, path: &Path) -> Option<String> {
        let _ = std::fs::remove_file(path);
        ContentFingerprint.fingerprint(path)
    }
}

#[test]
fn scan_yields_records_in_traversal_order_with_digests() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    write(root.join("b.txt"), b"bravo").expect("write b.txt");
    create_dir(root.join("a")).expect("create a");
    write(root.join("a/x.txt"), b"xray").expect("write a/x.txt");
    write(root.join("c.txt"), b"charlie").expect("write c.txt");

    let records = scanner(4).scan_all(root);

    assert_eq!(names(&records), vec!["x.txt", "b.txt", "c.txt"]);
    assert_eq!(records[0].path, root.join("a/x.txt"));
    assert_eq!(records[0].size, 4);
    assert_eq!(records[0].digest.as_deref(), Some(digest_bytes(b"xray").as_str()));
    assert_eq!(records[2].digest.as_deref(), Some(digest_bytes(b"charlie").as_str()));
}

#[test]
fn two_scans_of_unchanged_tree_are_identical() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    for i in 0..30 {
        let dir = root.join(format!("d{}", i % 5));
        std::fs::create_dir_all(&dir).expect("create dir");
        write(dir.join(format!("f{i:02}")), format!("content {}", i % 7)).expect("write");
    }

    let scanner = scanner(3);
    let first = scanner.scan_all(root);
    let second = scanner.scan_all(root);

    assert_eq!(first.len(), 30);
    assert_eq!(first, second);
    assert!(first.iter().all(FileRecord::has_digest));
}

#[test]
fn delayed_first_file_is_still_emitted_first() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
        write(root.join(name), name.as_bytes()).expect("write file");
    }

    let slow = Arc::new(DelayFirst {
        slow_name: "a.txt",
        delay: Duration::from_millis(300),
        completed: Mutex::new(Vec::new()),
    });
    let records = scanner(4)
        .with_fingerprint(Arc::clone(&slow) as Arc<dyn Fingerprint>)
        .scan_all(root);

    assert_eq!(
        names(&records),
        vec!["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]
    );

    let completed = slow.completed.lock().expect("completion log");
    assert_eq!(completed.len(), 5);
    assert_ne!(
        completed[0], "a.txt",
        "the delayed file should have finished after later ones",
    );
}

#[test]
fn hello_scenario_tracks_content_changes() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    write(root.join("A"), b"hello").expect("write A");
    write(root.join("B"), b"hello").expect("write B");

    let scanner = scanner(2);

    let before = scanner.scan_all(root);
    assert_eq!(before.len(), 2);
    assert_eq!(digest_of(&before, "A"), digest_of(&before, "B"));

    write(root.join("B"), b"hello!").expect("rewrite B");

    let after = scanner.scan_all(root);
    assert_eq!(after.len(), 2);
    assert_ne!(digest_of(&after, "A"), digest_of(&after, "B"));
    assert_eq!(digest_of(&before, "A"), digest_of(&after, "A"));
}

#[test]
fn empty_and_missing_roots_yield_nothing() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let scanner = scanner(2);

    assert!(scanner.scan_all(tmp.path()).is_empty());
    assert!(scanner.scan_all(tmp.path().join("does-not-exist")).is_empty());
}

#[test]
fn vanished_file_still_yields_record_without_digest() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    write(root.join("ghost.txt"), b"boo!").expect("write file");

    let records = scanner(1)
        .with_fingerprint(Arc::new(VanishBeforeRead))
        .scan_all(root);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "ghost.txt");
    assert_eq!(records[0].size, 4, "size is captured at discovery time");
    assert_eq!(records[0].digest, None);
}

#[test]
fn traversal_stays_within_lookahead_window() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    for i in 0..100 {
        write(root.join(format!("f{i:03}")), [i as u8]).expect("write file");
    }

    let counting = Arc::new(Counting::default());
    let lookahead = 4;
    let mut scan = scanner(2)
        .with_options(ScanOptions {
            lookahead,
            ..ScanOptions::default()
        })
        .with_fingerprint(Arc::clone(&counting) as Arc<dyn Fingerprint>)
        .scan(root);

    let first = scan.next().expect("first record");
    assert_eq!(first.name, "f000");
    assert_eq!(scan.position(), 1);

    // Give the traversal time to fill the window.
    thread::sleep(Duration::from_millis(100));

    // Popped record + a full channel + the one entry blocked in send.
    let computed = counting.calls.load(Ordering::SeqCst);
    assert!(
        computed <= lookahead + 2,
        "computed {computed} digests with a look-ahead of {lookahead}",
    );

    assert_eq!(scan.count(), 99);
}

#[test]
fn dropping_scan_early_leaves_pool_usable() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    for i in 0..200 {
        write(root.join(format!("f{i:03}")), format!("{i}")).expect("write file");
    }

    let scanner = scanner(2).with_options(ScanOptions {
        lookahead: 8,
        ..ScanOptions::default()
    });

    let taken: Vec<FileRecord> = scanner.scan(root).take(3).collect();
    assert_eq!(names(&taken), vec!["f000", "f001", "f002"]);

    let handle = scanner.pool().submit(|| 42);
    assert_eq!(handle.wait(), Some(42));
    assert_eq!(scanner.scan_all(root).len(), 200);
}

#[test]
fn concurrent_scans_share_one_pool() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path().to_path_buf();
    for i in 0..10 {
        write(root.join(format!("file{i}.txt")), format!("Different content {i}"))
            .expect("write file");
    }

    let scanner = scanner(4);
    let expected = scanner.scan_all(&root);

    let results: Vec<Vec<FileRecord>> = thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|_| s.spawn(|| scanner.scan_all(&root)))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("scan thread"))
            .collect()
    });

    for records in results {
        assert_eq!(records, expected);
    }

    let unique: std::collections::HashSet<_> =
        expected.iter().filter_map(|r| r.digest.clone()).collect();
    assert_eq!(unique.len(), 10);
}

#[test]
#[should_panic(expected = "worker pool has been shut down")]
fn scanning_with_a_shut_down_pool_panics_on_the_consumer() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    write(tmp.path().join("one.txt"), b"1").expect("write file");

    let scanner = scanner(1);
    scanner.pool().shutdown();

    let _ = scanner.scan_all(tmp.path());
}
