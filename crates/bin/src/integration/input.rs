//! Request bodies from files or stdin.

use std::io::Read;
use std::path::Path;

/// Read a text input; `-` reads stdin.
pub(crate) fn read_text(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    std::fs::read_to_string(path)
}
