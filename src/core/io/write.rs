use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Writes contents to a file, creating parent directories if they don't exist.
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(contents.as_ref())?;
    Ok(())
}

/// Pretty-printed JSON dump of any serialisable value
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("subdir/test.txt");

        write_file(&file_path, "Hello, world!").unwrap();

        assert_eq!(fs::read_to_string(file_path).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_write_json() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out/summary.json");

        write_json(&file_path, &vec![1, 2, 3]).unwrap();

        let text = fs::read_to_string(file_path).unwrap();
        let back: Vec<i32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
