//! Writing rendered output to disk
//!
//! The file is written next to its destination and renamed into place, so a
//! failed run never leaves a truncated file behind.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

fn temporary_path(destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .map_or_else(|| String::from("output"), |name| name.to_string_lossy().into_owned());
    destination.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}

/// Replace `destination` with `contents` (UTF-8).
pub async fn write_atomically(destination: &Path, contents: &str) -> io::Result<()> {
    let temporary = temporary_path(destination);
    debug!("Writing {} bytes to {}", contents.len(), temporary.display());

    if let Err(e) = write_then_rename(&temporary, destination, contents).await {
        let _ = fs::remove_file(&temporary).await;
        return Err(e);
    }

    Ok(())
}

async fn write_then_rename(temporary: &Path, destination: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(temporary).await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temporary, destination).await
}
