use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

/// Resolves `filename` against the served directory.
///
/// The name comes straight from the client and is not sanitized: `..`
/// components and absolute paths are honored as given.
pub fn resolve_path(root: &Path, filename: &str) -> PathBuf {
    root.join(filename)
}

/// Opens the requested file before the command is acknowledged.
pub async fn open_file(root: &Path, filename: &str) -> Result<File, io::Error> {
    let path = resolve_path(root, filename);
    let file = File::open(&path).await?;
    debug!("Opened {:?} for reading", path);
    Ok(file)
}

/// Reads the whole file from the start.
pub async fn read_file(file: &mut File) -> Result<Vec<u8>, io::Error> {
    file.seek(SeekFrom::Start(0)).await?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).await?;
    Ok(contents)
}
