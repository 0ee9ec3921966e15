// CrashMinder - platform/fs.rs
//
// Small filesystem helpers shared by the browser and the notifier.

use std::io;
use std::path::Path;

/// Read the full content of a file as a string.
///
/// Crash reports occasionally embed non-UTF-8 bytes (binary image names,
/// truncated writes); lossy conversion keeps the rest of the report usable.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
