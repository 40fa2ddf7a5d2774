//! Write-then-rename helper so a reader that opens a companion file between
//! two writes never observes a half-written file (`spec.md` §5).

use std::fs;
use std::io;
use std::path::Path;

pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    fs::write(tmp.path(), contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
