use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Read a text file line by line, trailing whitespace stripped
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?.trim_end().to_string());
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tweets.txt");
        fs::write(&path, "first  \n\nsecond\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["first", "", "second"]);
    }
}
