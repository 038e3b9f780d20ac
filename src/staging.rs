// src/staging.rs
//
// Per-request scratch space and content digest for the upload pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::error::UploadError;

/// A request-scoped scratch directory under the configured scratch root.
///
/// Every staged file for one upload lives inside this directory, so the
/// staged-file list and the on-disk state cannot drift apart. The directory
/// is removed when the guard drops; the happy path calls [`cleanup`] to do
/// the same thing explicitly before responding.
///
/// [`cleanup`]: ScratchDir::cleanup
pub struct ScratchDir {
    path: PathBuf,
    released: bool,
}

impl ScratchDir {
    /// Create `root/{request_id}` and return a guard owning it.
    pub fn create(root: &Path, request_id: &str) -> Result<Self, UploadError> {
        let path = root.join(request_id);
        fs::create_dir_all(&path)?;
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and disarm the drop guard.
    pub fn cleanup(mut self) {
        self.remove();
        self.released = true;
    }

    fn remove(&self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory");
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.released {
            self.remove();
        }
    }
}

/// SHA-1 over the given byte buffers in iteration order, base64-encoded.
///
/// Callers pass uploaded-file bytes in index order, which makes the digest
/// deterministic for a given sequence of uploads.
pub fn combined_digest<I, B>(parts: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    BASE64_STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vector() {
        // SHA-1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        let digest = combined_digest([b"abc".as_slice()]);
        assert_eq!(digest, "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn digest_of_nothing_is_sha1_of_empty_input() {
        let digest = combined_digest(Vec::<Vec<u8>>::new());
        assert_eq!(digest, "2jmj7l5rSw0yVb/vlWAYkK/YBwk=");
    }

    #[test]
    fn digest_is_over_the_concatenation_in_order() {
        let split = combined_digest([b"ab".as_slice(), b"c".as_slice()]);
        let whole = combined_digest([b"abc".as_slice()]);
        assert_eq!(split, whole);

        let reversed = combined_digest([b"c".as_slice(), b"ab".as_slice()]);
        assert_ne!(reversed, whole);
    }

    #[test]
    fn scratch_dir_is_removed_on_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path(), "req-1").unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(scratch.file_path("0.pdf"), b"%PDF-1.4").unwrap();
        assert!(path.exists());

        scratch.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn scratch_dir_is_removed_when_dropped_early() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create(root.path(), "req-2").unwrap();
            std::fs::write(scratch.file_path("result0.pdf"), b"%PDF-1.4").unwrap();
            scratch.path().to_path_buf()
            // dropped here, as on an error return
        };
        assert!(!path.exists());
    }

    #[test]
    fn scratch_dirs_are_namespaced_by_request_id() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(root.path(), "req-a").unwrap();
        let b = ScratchDir::create(root.path(), "req-b").unwrap();
        assert_ne!(a.file_path("0.pdf"), b.file_path("0.pdf"));
        std::fs::write(a.file_path("0.pdf"), b"first").unwrap();
        std::fs::write(b.file_path("0.pdf"), b"second").unwrap();
        assert_eq!(std::fs::read(a.file_path("0.pdf")).unwrap(), b"first");
    }
}
