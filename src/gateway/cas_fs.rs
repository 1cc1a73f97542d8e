use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

const CAS_PREFIX: &str = "cas:sha256:";

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Store `bytes` under their sha256 and return the `cas:sha256:<hex>` reference.
/// Writing the same content twice is a no-op.
pub fn write_cas(root: &Path, bytes: &[u8]) -> Result<String> {
    let hex = sha256_hex(bytes);
    let path = blob_path(root, &hex);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    if !path.exists() {
        fs::write(&path, bytes)?;
    }
    Ok(format!("{}{}", CAS_PREFIX, hex))
}

/// Resolve a `cas:sha256:<hex>` reference to the blob path on disk.
pub fn resolve_cas(root: &Path, cas_ref: &str) -> Result<PathBuf> {
    let hex = cas_ref
        .strip_prefix(CAS_PREFIX)
        .filter(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| PipelineError::InvalidReference(cas_ref.to_string()))?;
    let path = blob_path(root, hex);
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.display().to_string()));
    }
    Ok(path)
}

pub fn read_cas(root: &Path, cas_ref: &str) -> Result<Vec<u8>> {
    let path = resolve_cas(root, cas_ref)?;
    Ok(fs::read(path)?)
}

fn blob_path(root: &Path, hex: &str) -> PathBuf {
    root.join("sha256").join(&hex[0..2]).join(&hex[2..4]).join(hex)
}
