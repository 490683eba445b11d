use super::*;
use crate::config::DIGEST_HEX_LEN;
use std::fs::write;

#[test]
fn digest_bytes_is_fixed_width_lowercase_hex() {
    let cases: &[&[u8]] = &[b"", b"a", b"hello", &[0xffu8; 1000]];

    for data in cases {
        let d = digest_bytes(data);
        assert_eq!(d.len(), DIGEST_HEX_LEN, "digest {d:?} has wrong width");
        assert!(
            d.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "digest {d:?} is not lowercase hex",
        );
    }
}

#[test]
fn digest_bytes_depends_only_on_content() {
    assert_eq!(digest_bytes(b"hello"), digest_bytes(b"hello"));
    assert_ne!(digest_bytes(b"hello"), digest_bytes(b"hello!"));
    assert_ne!(digest_bytes(b"ab"), digest_bytes(b"ba"));
}

#[test]
fn fingerprint_path_streams_across_buffer_boundaries() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("big.bin");

    let content: Vec<u8> = (0..READ_BUFFER_SIZE * 3 + 17)
        .map(|i| (i % 251) as u8)
        .collect();
    write(&path, &content).expect("write big file");

    let streamed = fingerprint_path(&path).expect("fingerprint big file");
    assert_eq!(streamed, digest_bytes(&content));
}

#[test]
fn empty_file_has_a_real_digest() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("empty");
    write(&path, b"").expect("write empty file");

    assert_eq!(ContentFingerprint.fingerprint(&path), Some(digest_bytes(b"")));
}

#[test]
fn missing_file_yields_none() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("gone");

    assert!(fingerprint_path(&path).is_err());
    assert_eq!(ContentFingerprint.fingerprint(&path), None);
}

#[cfg(unix)]
#[test]
fn symlink_digest_is_digest_of_target_string() {
    use std::os::unix::fs::symlink;

    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    write(root.join("real.txt"), b"payload").expect("write target");
    symlink("real.txt", root.join("link")).expect("symlink");
    symlink("nowhere", root.join("dangling")).expect("dangling symlink");

    assert_eq!(
        ContentFingerprint.fingerprint(&root.join("link")),
        Some(digest_bytes(b"real.txt")),
    );
    assert_ne!(
        ContentFingerprint.fingerprint(&root.join("link")),
        ContentFingerprint.fingerprint(&root.join("real.txt")),
        "a link is not a copy of its target",
    );
    assert_eq!(
        ContentFingerprint.fingerprint(&root.join("dangling")),
        Some(digest_bytes(b"nowhere")),
    );
}

#[cfg(unix)]
#[test]
fn file_swapped_for_link_is_hashed_as_link() {
    use std::os::unix::fs::symlink;

    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("entry");
    write(&path, b"original bytes").expect("write file");
    let as_file = ContentFingerprint.fingerprint(&path);

    std::fs::remove_file(&path).expect("remove file");
    symlink("elsewhere", &path).expect("symlink");

    let as_link = ContentFingerprint.fingerprint(&path);
    assert_eq!(as_link, Some(digest_bytes(b"elsewhere")));
    assert_ne!(as_link, as_file);
}
