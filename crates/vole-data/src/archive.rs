// Zip extraction for packaged datasets

use std::fs;
use std::io;
use std::path::Path;

use vole_core::{Error, Result};
use zip::ZipArchive;

/// Extract a zip archive into `dest`, creating directories as needed.
///
/// Returns the number of files written. Entries whose names escape the
/// destination (absolute paths, `..` components) are rejected rather than
/// written.
pub fn extract_zip<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, dest: Q) -> Result<usize> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();

    let file = fs::File::open(archive)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| Error::config(format!("cannot open archive {:?}: {}", archive, e)))?;

    fs::create_dir_all(dest)?;

    let mut written = 0usize;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::config(format!("archive {:?} entry {}: {}", archive, i, e)))?;
        let rel = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(Error::config(format!(
                    "archive {:?} entry {:?} escapes the destination",
                    archive,
                    entry.name()
                )))
            }
        };
        let out_path = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
            written += 1;
        }
    }
    Ok(written)
}
