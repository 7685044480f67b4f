//! Script-mode source packaging.
//!
//! SageMaker expects the entry point and its support files as a gzipped tar
//! archive in S3; the training toolkit unpacks it inside the container.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io;
use std::path::Path;

/// Package the source directory into an in-memory `sourcedir.tar.gz`.
/// Source directories are scripts, not datasets; buffering them is fine.
pub fn bundle_source_dir(source_dir: &Path) -> io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);
    archive.append_dir_all(".", source_dir)?;
    let encoder = archive.into_inner()?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut reader = tar::Archive::new(GzDecoder::new(archive));
        reader
            .entries()
            .expect("should list entries")
            .map(|entry| {
                entry
                    .expect("should read entry")
                    .path()
                    .expect("should have path")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_bundle_contains_source_files() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        fs::write(dir.path().join("train.py"), "print('training')").expect("should write");
        fs::create_dir(dir.path().join("lib")).expect("should create subdir");
        fs::write(dir.path().join("lib").join("util.py"), "pass").expect("should write");

        let archive = bundle_source_dir(dir.path()).expect("should bundle");
        let names = entry_names(&archive);
        assert!(
            names.iter().any(|name| name.ends_with("train.py")),
            "entries were: {names:?}"
        );
        assert!(
            names.iter().any(|name| name.ends_with("util.py")),
            "entries were: {names:?}"
        );
    }

    #[test]
    fn test_bundle_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let missing = dir.path().join("does-not-exist");
        assert!(bundle_source_dir(&missing).is_err());
    }
}
