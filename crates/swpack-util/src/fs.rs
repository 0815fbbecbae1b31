use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read a text artifact that is about to be rewritten.
///
/// Invalid UTF-8 is an error naming the file: rewriting it as text would
/// replace the offending bytes.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} is not valid UTF-8 (byte {})",
                path.display(),
                err.utf8_error().valid_up_to()
            ),
        )
    })
}

/// Replace the contents of `path` by writing a sibling temp file and renaming it over.
///
/// The temp file is synced before the rename, so readers observe either the
/// old artifact or the new one, never a partial write.
///
/// # Errors
/// Returns an error if the temp file cannot be written or the rename fails.
pub fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let temp = sibling_temp_path(path);
    if let Err(err) = write_synced(&temp, contents) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp, path) {
        // Windows refuses to rename over an existing file.
        if cfg!(windows) && path.exists() {
            let copied = fs::copy(&temp, path).map(|_| ());
            let _ = fs::remove_file(&temp);
            return copied;
        }
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    Ok(())
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    let temp_name = format!(".{name}.swpack-{}", std::process::id());
    match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_text_valid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sw.js");
        fs::write(&path, "self.VERSION = '%SW_VERSION%';").unwrap();

        assert_eq!(read_text(&path).unwrap(), "self.VERSION = '%SW_VERSION%';");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sw.js");
        fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();

        let err = read_text(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("sw.js is not valid UTF-8 (byte 2)"));
    }

    #[test]
    fn test_read_text_missing() {
        let dir = tempdir().unwrap();
        let err = read_text(&dir.path().join("nope.js")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_replace_file_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sw.js");
        fs::write(&path, "old").unwrap();

        replace_file(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_replace_file_keeps_bytes_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sw.js");
        let contents = [b'a', 0xff, 0xfe, b'\n'];

        replace_file(&path, &contents).unwrap();
        assert_eq!(fs::read(&path).unwrap(), contents);
    }

    #[test]
    fn test_replace_file_missing_dir_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/sw.js");

        assert!(replace_file(&path, b"content").is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_replace_file_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("push.js");

        replace_file(&path, b"content").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["push.js".to_string()]);
    }
}
