use std::path::Path;

/// Strip the final extension from a file name.
///
/// A leading dot (as in `.hidden`) is not treated as an extension.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Build the display name for `path` relative to the scan `root`.
///
/// Path segments are joined with `separator` and the extension of the final
/// segment is stripped: `root/sub/b.mp3` becomes `sub / b` with the default
/// separator.
pub fn display_name(root: &Path, path: &Path, separator: &str) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);

    let mut segments: Vec<&str> = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    if let Some(last) = segments.last_mut() {
        *last = strip_extension(last);
    }

    if segments.is_empty() {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string()
    } else {
        segments.join(separator)
    }
}
