use log::debug;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use tokio::fs;

/// Builds the LIST payload: one entry name per line, `.` and `..` first,
/// then the rest in the order the directory yields them. Names are sent
/// as the raw bytes stored on disk.
pub async fn list_directory(root: &Path) -> Result<Vec<u8>, io::Error> {
    let mut entries = fs::read_dir(root).await?;
    let mut listing = Vec::new();
    let mut count = 0usize;

    for special in [".", ".."] {
        push_entry(&mut listing, OsStr::new(special));
    }
    while let Some(entry) = entries.next_entry().await? {
        push_entry(&mut listing, &entry.file_name());
        count += 1;
    }

    debug!("Listed {} entries in {:?}", count, root);
    Ok(listing)
}

fn push_entry(listing: &mut Vec<u8>, name: &OsStr) {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        listing.extend_from_slice(name.as_bytes());
    }
    #[cfg(not(unix))]
    listing.extend_from_slice(name.to_string_lossy().as_bytes());

    listing.push(b'\n');
}
