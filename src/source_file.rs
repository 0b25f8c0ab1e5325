use std::io::Write;
use std::path::Path;

use crate::buffer::SourceBuffer;
use crate::error::Error;

/// Read the whole amalgamation into memory.
pub fn read_source(path: &Path) -> Result<SourceBuffer, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourceBuffer::new(text))
}

/// Replace the file at `path` with `buffer`.
///
/// The text is written to a temporary file next to the target and renamed over
/// it, so a failed write leaves the original untouched.
pub fn write_source(path: &Path, buffer: &SourceBuffer) -> Result<(), Error> {
    let unwritable = |source: std::io::Error| Error::FileUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(unwritable)?;
    tmp.write_all(buffer.as_str().as_bytes())
        .map_err(unwritable)?;
    tmp.as_file().sync_all().map_err(unwritable)?;

    if let Ok(metadata) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), metadata.permissions()).map_err(unwritable)?;
    }

    tmp.persist(path).map_err(|e| unwritable(e.error))?;
    Ok(())
}
