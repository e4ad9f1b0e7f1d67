//! Zip archive of a bundle directory.

use std::{
    ffi::OsString,
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Archive errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Zip encoding error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Maximum deflate level.
pub const COMPRESSION_LEVEL: i64 = 9;

/// Sibling archive path for a directory: `<dir>.zip`.
///
/// Trailing separators are ignored, so `public/` archives to `public.zip`
/// next to the directory rather than inside it.
#[must_use]
pub fn archive_path(dir: &Path) -> PathBuf {
    let dir: PathBuf = dir.components().collect();
    match dir.file_name() {
        Some(name) => {
            let mut file = name.to_os_string();
            file.push(".zip");
            dir.with_file_name(file)
        }
        None => {
            let mut path = OsString::from(dir.as_os_str());
            path.push(".zip");
            PathBuf::from(path)
        }
    }
}

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    /// Uncompressed bytes.
    pub total_size: u64,
    /// Archive size on disk.
    pub compressed_size: u64,
}

/// Zip the contents of `dir` into `<dir>.zip`.
///
/// Entries are relative to `dir`, use `/` separators and appear in sorted
/// order with a fixed timestamp, so identical trees give identical archives.
pub fn create_archive(dir: &Path) -> Result<ArchiveSummary> {
    let output = archive_path(dir);
    let mut zip = ZipWriter::new(BufWriter::new(File::create(&output)?));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(zip::DateTime::default());

    let mut files = 0;
    let mut total_size = 0u64;

    for entry in WalkDir::new(dir).sort_by_file_name().min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name.as_str(), options)?;
            let mut file = File::open(entry.path())?;
            total_size += io::copy(&mut file, &mut zip)?;
            files += 1;
            debug!(entry = %name, "archived file");
        }
    }

    zip.finish()?;

    let compressed_size = std::fs::metadata(&output)?.len();
    info!(
        path = %output.display(),
        files,
        total_size,
        compressed_size,
        "archive created"
    );

    Ok(ArchiveSummary {
        path: output,
        files,
        total_size,
        compressed_size,
    })
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Read};

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_archive_path() {
        assert_eq!(archive_path(Path::new("/tmp/site")), PathBuf::from("/tmp/site.zip"));
        assert_eq!(archive_path(Path::new("/tmp/site/")), PathBuf::from("/tmp/site.zip"));
        assert_eq!(archive_path(Path::new("public//")), PathBuf::from("public.zip"));
    }

    #[test]
    fn test_trailing_slash_archives_next_to_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("site");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();

        let with_slash = PathBuf::from(format!("{}/", dir.display()));
        let summary = create_archive(&with_slash).unwrap();

        assert_eq!(summary.path, tmp.path().join("site.zip"));
        assert!(!dir.join(".zip").exists());

        let archive = ZipArchive::new(File::open(&summary.path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec!["index.html"]);
    }

    #[test]
    fn test_create_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("site");
        fs::create_dir_all(dir.join("assets")).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();
        fs::write(dir.join("assets/style.css"), "body{}").unwrap();

        let summary = create_archive(&dir).unwrap();
        assert_eq!(summary.path, tmp.path().join("site.zip"));
        assert_eq!(summary.files, 2);
        assert_eq!(summary.total_size, 19);

        let mut archive = ZipArchive::new(File::open(&summary.path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["assets/", "assets/style.css", "index.html"]);

        let mut css = String::new();
        archive
            .by_name("assets/style.css")
            .unwrap()
            .read_to_string(&mut css)
            .unwrap();
        assert_eq!(css, "body{}");
    }

    #[test]
    fn test_archive_is_reproducible() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("site");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::write(dir.join("b.txt"), "b").unwrap();

        let first = fs::read(create_archive(&dir).unwrap().path).unwrap();
        let second = fs::read(create_archive(&dir).unwrap().path).unwrap();
        assert_eq!(first, second);
    }
}
