//! Small file primitives: atomic overwrite, separator-aware append

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Overwrite `path` with `contents` via tmp→rename.
///
/// Readers polling the file see either the old or the new value, never a
/// partial write.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

/// Read a whole file, `None` if it does not exist.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Append one line to `path`, creating it if needed.
///
/// If the file is non-empty and its last byte is not a newline (a previous
/// run ended on an unterminated line), a separator is written first.
/// `terminate` controls whether the new line gets its own trailing newline.
pub fn append_line(path: &Path, line: &str, terminate: bool) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut out = String::with_capacity(line.len() + 2);
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            out.push('\n');
        }
    }
    out.push_str(line);
    if terminate {
        out.push('\n');
    }
    file.write_all(out.as_bytes())?;
    file.sync_data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.txt");
        write_atomic(&path, "0/0").unwrap();
        write_atomic(&path, "3/10").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "3/10");
        assert!(!dir.path().join("progress.txt.tmp").exists());
    }

    #[test]
    fn read_optional_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(&dir.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn append_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.txt");
        append_line(&path, "AAAA", true).unwrap();
        append_line(&path, "BBBB", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "AAAA\nBBBB");
    }

    #[test]
    fn append_restores_missing_separator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.txt");
        fs::write(&path, "AAAA").unwrap();
        append_line(&path, "BBBB", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "AAAA\nBBBB\n");
    }

    #[test]
    fn append_after_terminated_line_adds_no_blank() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.txt");
        fs::write(&path, "AAAA\n").unwrap();
        append_line(&path, "BBBB", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "AAAA\nBBBB");
    }
}
