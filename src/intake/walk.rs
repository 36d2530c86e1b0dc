use std::path::PathBuf;

/// Expands files and directories into the sorted list of candidate files.
/// Symlinked directories are not followed. Unreadable entries are logged and
/// left out.
pub async fn collect_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = roots.to_vec();

    while let Some(path) = pending.pop() {
        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Skipping unreadable path {}: {}", path.display(), e);
                continue;
            }
        };

        if metadata.file_type().is_symlink() {
            match tokio::fs::metadata(&path).await {
                Ok(target) if target.is_dir() => {
                    tracing::debug!("Not following symlinked directory {}", path.display());
                }
                Ok(_) => files.push(path),
                Err(e) => {
                    tracing::warn!("Skipping dangling link {}: {}", path.display(), e);
                }
            }
            continue;
        }

        if !metadata.is_dir() {
            files.push(path);
            continue;
        }

        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory {}: {}", path.display(), e);
                continue;
            }
        };
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => pending.push(entry.path()),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Stopped listing {}: {}", path.display(), e);
                    break;
                }
            }
        }
    }

    files.sort();
    files
}
