//! Write-temp-then-rename publisher.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::{PublishError, TEMP_SUFFIX};

/// Publishes labels to a single target file.
///
/// Only one publisher should write a given target; readers may open the
/// target at any time.
#[derive(Debug, Clone)]
pub struct Publisher {
    target: PathBuf,
    temp: PathBuf,
    encoding: &'static Encoding,
}

impl Publisher {
    /// Creates a publisher for `target` that encodes labels with `encoding`.
    ///
    /// `encoding` must be able to encode (UTF-16 variants cannot, see
    /// [`Encoding::output_encoding`]).
    pub fn new(target: impl Into<PathBuf>, encoding: &'static Encoding) -> Self {
        let target = target.into();
        let temp = temp_path_for(&target);
        Self {
            target,
            temp,
            encoding,
        }
    }

    /// Returns the target file path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns the staging file path.
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Returns the output encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Checks that the target can be written by preparing its directory.
    pub fn prepare(&self) -> Result<(), PublishError> {
        ensure_parent_dir(&self.target)
    }

    /// Removes a staging file left behind by an interrupted process.
    ///
    /// Returns whether a file was removed.
    pub fn discard_stale_temp(&self) -> bool {
        if !self.temp.is_file() {
            return false;
        }
        match std::fs::remove_file(&self.temp) {
            Ok(()) => {
                tracing::info!(path = %self.temp.display(), "removed stale temp file");
                true
            }
            Err(e) => {
                tracing::warn!(path = %self.temp.display(), error = %e, "failed to remove stale temp file");
                false
            }
        }
    }

    /// Atomically replaces the target content with `label`.
    ///
    /// Returns the published label. On error the target keeps its previous
    /// content and the staging file is removed when possible.
    pub fn publish(&self, label: &str) -> Result<String, PublishError> {
        self.prepare()?;

        let bytes = self.encode(label)?;

        if let Err(source) = write_synced(&self.temp, &bytes) {
            tracing::error!(path = %self.temp.display(), error = %source, "failed to write temp file");
            remove_quietly(&self.temp);
            return Err(PublishError::Write {
                path: self.temp.clone(),
                source,
            });
        }

        if let Err(source) = std::fs::rename(&self.temp, &self.target) {
            tracing::error!(
                dest = %self.target.display(),
                temp = %self.temp.display(),
                error = %source,
                "failed to replace target with temp file"
            );
            remove_quietly(&self.temp);
            return Err(PublishError::Replace {
                temp: self.temp.clone(),
                target: self.target.clone(),
                source,
            });
        }

        tracing::debug!(dest = %self.target.display(), label, "label published");
        Ok(label.to_string())
    }

    fn encode(&self, label: &str) -> Result<Vec<u8>, PublishError> {
        let (bytes, _, had_errors) = self.encoding.encode(label);
        if had_errors {
            let source = std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("label {label:?} is not representable in {}", self.encoding.name()),
            );
            tracing::error!(path = %self.temp.display(), error = %source, "failed to encode label");
            return Err(PublishError::Write {
                path: self.temp.clone(),
                source,
            });
        }
        Ok(bytes.into_owned())
    }
}

/// Ensures the directory containing `target` exists.
///
/// Succeeds when another process creates the directory concurrently.
pub fn ensure_parent_dir(target: &Path) -> Result<(), PublishError> {
    let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    match std::fs::create_dir_all(parent) {
        Ok(()) => {
            tracing::info!(path = %parent.display(), "created directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && parent.is_dir() => Ok(()),
        Err(source) => {
            tracing::error!(path = %parent.display(), error = %source, "failed to create directory");
            Err(PublishError::Directory {
                path: parent.to_path_buf(),
                source,
            })
        }
    }
}

/// Returns the staging path for `target`: the same name with `.tmp` appended.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn remove_quietly(path: &Path) {
    if path.is_file() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use encoding_rs::{UTF_8, WINDOWS_1251};

    fn test_publisher() -> (tempfile::TempDir, Publisher) {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(tmp.path().join("broad.txt"), UTF_8);
        (tmp, publisher)
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path_for(Path::new("/srv/out/broad.txt")),
            PathBuf::from("/srv/out/broad.txt.tmp")
        );
        assert_eq!(temp_path_for(Path::new("now")), PathBuf::from("now.tmp"));
    }

    #[test]
    fn publish_writes_exact_content() {
        let (_tmp, publisher) = test_publisher();
        let published = publisher.publish("morning_show").unwrap();

        assert_eq!(published, "morning_show");
        assert_eq!(std::fs::read(publisher.target()).unwrap(), b"morning_show");
        assert!(!publisher.temp_path().exists());
    }

    #[test]
    fn publish_replaces_previous_content() {
        let (_tmp, publisher) = test_publisher();
        std::fs::write(publisher.target(), "a much longer previous label").unwrap();

        publisher.publish("short").unwrap();
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "short");
    }

    #[test]
    fn publish_same_label_twice() {
        let (_tmp, publisher) = test_publisher();
        assert_eq!(publisher.publish("Radio Muzlo").unwrap(), "Radio Muzlo");
        assert_eq!(publisher.publish("Radio Muzlo").unwrap(), "Radio Muzlo");
        assert_eq!(
            std::fs::read_to_string(publisher.target()).unwrap(),
            "Radio Muzlo"
        );
    }

    #[test]
    fn publish_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a").join("b").join("broad.txt");
        let publisher = Publisher::new(&target, UTF_8);

        publisher.publish("track01").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "track01");
    }

    #[test]
    fn publish_uses_output_encoding() {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(tmp.path().join("broad.txt"), WINDOWS_1251);

        publisher.publish("Песня").unwrap();
        assert_eq!(
            std::fs::read(publisher.target()).unwrap(),
            vec![0xCF, 0xE5, 0xF1, 0xED, 0xFF]
        );
    }

    #[test]
    fn unencodable_label_is_write_error() {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(tmp.path().join("broad.txt"), WINDOWS_1251);
        std::fs::write(publisher.target(), "previous").unwrap();

        let err = publisher.publish("日本").unwrap_err();
        assert!(matches!(err, PublishError::Write { .. }), "got {err:?}");
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "previous");
        assert!(!publisher.temp_path().exists());
    }

    #[test]
    fn directory_error_leaves_files_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();
        let publisher = Publisher::new(blocker.join("sub").join("broad.txt"), UTF_8);

        let err = publisher.publish("label").unwrap_err();
        assert!(matches!(err, PublishError::Directory { .. }), "got {err:?}");
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "file");
        assert!(publisher.prepare().is_err());
    }

    #[test]
    fn write_error_keeps_target() {
        let (_tmp, publisher) = test_publisher();
        std::fs::write(publisher.target(), "previous").unwrap();
        // A directory squatting on the staging path makes the write fail.
        std::fs::create_dir(publisher.temp_path()).unwrap();

        let err = publisher.publish("new").unwrap_err();
        assert!(matches!(err, PublishError::Write { .. }), "got {err:?}");
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "previous");
    }

    #[test]
    fn replace_error_removes_temp() {
        let (_tmp, publisher) = test_publisher();
        std::fs::create_dir(publisher.target()).unwrap();

        let err = publisher.publish("new").unwrap_err();
        assert!(matches!(err, PublishError::Replace { .. }), "got {err:?}");
        assert!(!publisher.temp_path().exists());
        assert!(publisher.target().is_dir());
    }

    #[test]
    fn interrupted_publish_keeps_previous_content() {
        let (_tmp, publisher) = test_publisher();
        publisher.publish("before").unwrap();

        // Process killed after staging a partial write, before the rename.
        std::fs::write(publisher.temp_path(), "aft").unwrap();
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "before");

        assert!(publisher.discard_stale_temp());
        assert!(!publisher.temp_path().exists());
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "before");

        publisher.publish("after").unwrap();
        assert_eq!(std::fs::read_to_string(publisher.target()).unwrap(), "after");
    }

    #[test]
    fn discard_without_stale_temp() {
        let (_tmp, publisher) = test_publisher();
        assert!(!publisher.discard_stale_temp());
    }

    #[test]
    fn prepare_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(tmp.path().join("out").join("broad.txt"), UTF_8);
        publisher.prepare().unwrap();
        publisher.prepare().unwrap();
        assert!(tmp.path().join("out").is_dir());
    }

    #[test]
    fn relative_target_without_parent() {
        assert!(ensure_parent_dir(Path::new("broad.txt")).is_ok());
    }
}
