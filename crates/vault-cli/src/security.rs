//! Secret and session file handling.
//!
//! Every file written here is created readable by the owner only; there is
//! no window where it exists with wider permissions.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::constants::SIGNING_SECRET_BYTES;

pub fn generate_secret_bytes() -> anyhow::Result<Zeroizing<[u8; SIGNING_SECRET_BYTES]>> {
    let mut bytes = Zeroizing::new([0u8; SIGNING_SECRET_BYTES]);
    getrandom::getrandom(bytes.as_mut())
        .map_err(|e| anyhow::anyhow!("Failed to generate signing secret: {}", e))?;
    Ok(bytes)
}

/// Write a new signing secret as base64, readable by the owner only.
///
/// Fails if the file already exists.
pub fn write_secret_file(path: &Path, secret: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let mut file = create_private(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => {
            anyhow::anyhow!("Signing secret already exists: {}", path.display())
        }
        _ => anyhow::anyhow!("Failed to create secret {}: {}", path.display(), e),
    })?;
    let encoded = Zeroizing::new(STANDARD.encode(secret));
    file.write_all(encoded.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = std::fs::remove_file(path);
            anyhow::anyhow!("Failed to write secret {}: {}", path.display(), e)
        })?;
    Ok(())
}

pub fn read_secret_file(path: &Path) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let contents = Zeroizing::new(
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read secret {}: {}", path.display(), e))?,
    );
    let bytes = STANDARD
        .decode(contents.trim())
        .map_err(|e| anyhow::anyhow!("Invalid signing secret {}: {}", path.display(), e))?;
    Ok(Zeroizing::new(bytes))
}

/// Replace `path` with `data` atomically, leaving it readable by the owner only.
pub fn write_private_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid path: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", path.display()))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut file = create_private(&temp_path)
        .map_err(|e| anyhow::anyhow!("Temp file create failed: {}", e))?;
    file.write_all(data)
        .map_err(|e| anyhow::anyhow!("Temp file write failed: {}", e))?;
    file.sync_all()
        .map_err(|e| anyhow::anyhow!("Temp file sync failed: {}", e))?;

    rename_with_fallback(&temp_path, path)
        .map_err(|e| anyhow::anyhow!("Atomic rename failed: {}", e))
}

/// Rename, removing an existing destination and retrying where rename refuses to replace.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(initial_err) = std::fs::rename(temp_path, destination) {
        let _ = std::fs::remove_file(destination);
        std::fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = std::fs::remove_file(temp_path);
            std::io::Error::new(
                retry_err.kind(),
                format!(
                    "initial: {}, retry: {}",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
        })?;
    }
    Ok(())
}

/// Create a new file with mode 0600 on unix. Fails if `path` exists.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
