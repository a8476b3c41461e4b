use relative_path::{RelativePath, RelativePathBuf};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid source directory: {0}")]
    InvalidSourceDir(String),
    #[error("Refusing to overwrite existing file: {0}")]
    AlreadyExists(PathBuf),
}

/// Read a markdown file and return its content
pub fn read_file(relative_path: &RelativePath, root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a file under `root`.
///
/// Without `overwrite`, an existing file is left untouched and
/// [`IoError::AlreadyExists`] is returned.
pub fn write_file(
    relative_path: &RelativePath,
    root: &Path,
    content: &str,
    overwrite: bool,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    if overwrite {
        return fs::write(&absolute_path, content).map_err(IoError::Io);
    }
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&absolute_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(IoError::AlreadyExists(absolute_path));
        }
        Err(e) => return Err(IoError::Io(e)),
    };
    file.write_all(content.as_bytes()).map_err(IoError::Io)
}

/// Markdown files directly inside `root`, sorted by name.
pub fn scan_markdown_files(root: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    if !root.exists() {
        return Err(IoError::InvalidSourceDir(
            "source directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(root).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => files.push(RelativePathBuf::from(name)),
            None => log::warn!("skipping file with non UTF-8 name: {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Output path for a source file: same stem, new extension.
pub fn output_path(source: &RelativePath, extension: &str) -> RelativePathBuf {
    source.with_extension(extension)
}

pub fn validate_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidSourceDir(format!(
            "Directory does not exist: {}",
            path.display()
        )));
    }

    Ok(())
}
