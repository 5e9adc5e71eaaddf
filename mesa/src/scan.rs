//! Scans source trees for stray string fragments that once leaked into
//! committed files (broken gradient classes and a mangled diff marker).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fragments that should never appear in committed source.
const PATTERNS: &[&str] = &[
    "skeleton-highlight",
    "120deg",
    "-:|",
    "bg-[",
    "linear-gradient",
];

const SCAN_EXTENSIONS: &[&str] = &["rs", "ts", "tsx", "js", "jsx", "css", "html", "yaml"];

const SKIP_DIRS: &[&str] = &["target", "node_modules", ".git", ".next"];

#[derive(Debug, PartialEq)]
pub struct ScanMatch {
    pub path: PathBuf,
    pub pattern: &'static str,
}

fn should_scan(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCAN_EXTENSIONS.contains(&ext))
}

fn scan_file(path: &Path, matches: &mut Vec<ScanMatch>) {
    // Unreadable or non-UTF-8 files are skipped, not reported
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    for pattern in PATTERNS {
        if content.contains(pattern) {
            matches.push(ScanMatch {
                path: path.to_path_buf(),
                pattern,
            });
        }
    }
}

fn walk(dir: &Path, matches: &mut Vec<ScanMatch>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let skip = name
                .to_str()
                .is_some_and(|name| SKIP_DIRS.contains(&name));
            if !skip {
                walk(&path, matches)?;
            }
        } else if should_scan(&path) {
            scan_file(&path, matches);
        }
    }
    Ok(())
}

pub fn scan_tree(root: &Path) -> io::Result<Vec<ScanMatch>> {
    let mut matches = Vec::new();
    walk(root, &mut matches)?;
    Ok(matches)
}

pub fn run(root: &Path) -> io::Result<()> {
    println!("scanning {} ...", root.display());
    let matches = scan_tree(root)?;

    for found in &matches {
        println!(
            "MATCH: {} contains \"{}\"",
            found.path.display(),
            found.pattern
        );
    }
    println!("{} match(es) in total", matches.len());

    Ok(())
}
