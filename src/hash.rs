//! BLAKE3 content digests for single-file change detection

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{self, Result};

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// Digest of an in-memory buffer
pub fn hash_bytes(content: &[u8]) -> String {
    format!("{}{}", HASH_PREFIX, blake3::hash(content).to_hex())
}

/// Digest of a file on disk, or `None` if the file does not exist
pub fn hash_file(path: &Path) -> Result<Option<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(error::fs::io_error(path, e)),
    };

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::fs::io_error(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Some(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())))
}

/// Compare two digests, tolerating a missing prefix on either side
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_string();
    normalize(expected) == normalize(actual)
}
