/*!
 * Utility functions for wixgen
 */

use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::walker::{TreeWalker, WalkOptions};

/// Count the files a generation run would turn into components
pub fn count_files(dir: &Path, options: &WalkOptions) -> Result<u64> {
    let mut count = 0;
    for visit in TreeWalker::new(dir, options.clone()) {
        count += visit?.files.len() as u64;
    }
    Ok(count)
}

/// Format a number with human-readable units
pub fn format_count(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Default patterns to ignore
///
/// Only files the operating system drops into folders on its own; anything
/// else in a build directory is assumed to be deliberate.
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // macOS
        ".DS_Store",
        "._*",
        ".Spotlight-V100",
        ".Trashes",
        // Windows
        "Thumbs.db",
        "ehthumbs.db",
        "desktop.ini",
        // Linux file managers
        ".directory",
    ]
});
