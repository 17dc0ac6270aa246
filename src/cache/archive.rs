//! Zipball extraction

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::{self, Result};

/// Unpack a repository zipball into `dest`.
///
/// Host zipballs nest everything under one `owner-repo-sha/` directory; that
/// level is stripped. Entries whose names would land outside `dest` are
/// skipped.
pub fn extract_zipball(bytes: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    fs::create_dir_all(dest).map_err(|e| error::fs::io_error(dest, e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(enclosed) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(name = entry.name(), "skipping archive entry outside destination");
            continue;
        };
        let Some(relative) = strip_top_level(&enclosed) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| error::fs::io_error(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| error::fs::io_error(parent, e))?;
        }
        let mut outfile = File::create(&target).map_err(|e| error::fs::io_error(&target, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| error::fs::io_error(&target, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                    .map_err(|e| error::fs::io_error(&target, e))?;
            }
        }
        written += 1;
    }

    tracing::debug!(dest = %dest.display(), files = written, "archive extracted");
    Ok(written)
}

/// Path below the top-level directory, or `None` for the directory itself
fn strip_top_level(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        _ => return None,
    }
    let rest: PathBuf = components.collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}
