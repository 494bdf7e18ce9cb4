// I/O utilities for reading and writing MP3 files

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{Result, TaggerError};

/// Read a big-endian signed 32-bit integer from the start of `bytes`
pub fn read_be_i32(bytes: &[u8]) -> Option<i32> {
    let buffer: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(i32::from_be_bytes(buffer))
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Read a whole MP3 file into memory.
///
/// The file is opened for writing as well, so a write-protected file is
/// detected (and made writable) here rather than at save time.
pub fn read_mp3(path: &Path) -> Result<Vec<u8>> {
    let is_mp3 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
    if !is_mp3 {
        return Err(TaggerError::OpenFile(path.display().to_string()));
    }

    let mut file = with_write_retry(path, || {
        OpenOptions::new().read(true).write(true).open(path)
    })?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Replace the contents of `path` with `data`
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = with_write_retry(path, || File::create(path))?;
    file.write_all(data)?;
    file.flush()?;
    Ok(())
}

/// Run `op`, and if it fails because the file is write-protected, grant the
/// owner write access and run it exactly once more.
fn with_write_retry<T>(path: &Path, mut op: impl FnMut() -> io::Result<T>) -> Result<T> {
    match op() {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            log::warn!("{} is write-protected, making it writable", path.display());
            make_writable(path)?;
            Ok(op()?)
        }
        other => Ok(other?),
    }
}

#[cfg(unix)]
fn make_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o200);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}
