use std::path::{Path, PathBuf};

use crate::parsing::sam::ParseError;

/// Read a list file: one alignment path per line, blank lines ignored.
/// Relative paths are taken as written.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::NoInputs` if it names no files.
pub fn read_list_file(path: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let mut inputs: Vec<PathBuf> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect();

    if inputs.is_empty() {
        return Err(ParseError::NoInputs(format!(
            "list file {} is empty",
            path.display()
        )));
    }

    inputs.sort();
    Ok(inputs)
}

/// Scan a directory for alignment files.
///
/// Without `bam`, any file whose name contains `.sam` is taken (this includes
/// `.sam.gz`); with `bam`, any name containing `.bam`.
///
/// # Errors
///
/// Returns `ParseError::Io` if the directory cannot be listed, or
/// `ParseError::NoInputs` if nothing matches.
pub fn scan_directory(dir: &Path, bam: bool) -> Result<Vec<PathBuf>, ParseError> {
    let needle = if bam { ".bam" } else { ".sam" };

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains(needle) {
            inputs.push(entry.path());
        }
    }

    if inputs.is_empty() {
        return Err(ParseError::NoInputs(format!(
            "no files containing '{needle}' in {}",
            dir.display()
        )));
    }

    inputs.sort();
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_aln.sam", "a_aln.sam.gz", "c.bam", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let sams = scan_directory(dir.path(), false).unwrap();
        let names: Vec<String> = sams
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_aln.sam.gz", "b_aln.sam"]);

        let bams = scan_directory(dir.path(), true).unwrap();
        assert_eq!(bams.len(), 1);
    }

    #[test]
    fn test_scan_directory_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan_directory(dir.path(), false),
            Err(ParseError::NoInputs(_))
        ));
    }

    #[test]
    fn test_read_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("files.txt");
        std::fs::write(&list, "z.sam\n\n  a.sam.gz\n").unwrap();
        let inputs = read_list_file(&list).unwrap();
        assert_eq!(inputs, vec![PathBuf::from("a.sam.gz"), PathBuf::from("z.sam")]);
    }
}
