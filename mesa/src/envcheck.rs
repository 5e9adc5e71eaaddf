//! Environment-file validation and repair.
//!
//! Two jobs: confirm the recognized configuration keys are present with
//! plausible values, and detect the known corruption where an editor glued a
//! key onto the end of the previous line (a missing newline before
//! `MESA_PUBLIC_APP_URL=`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Keys a working deployment needs in its environment file.
pub const REQUIRED_KEYS: &[&str] = &[
    "MESA_BILLING_SECRET_KEY",
    "MESA_WEBHOOK_SECRET",
    "MESA_SERVICE_ROLE_KEY",
    "MESA_PUBLIC_PROJECT_URL",
    "MESA_PUSH_DISPATCH_URL",
];

/// The key the corruption has been observed on.
const GLUED_KEY: &str = "MESA_PUBLIC_APP_URL=";

#[derive(Debug, Default, PartialEq)]
pub struct EnvReport {
    pub missing: Vec<&'static str>,
    pub warnings: Vec<String>,
    pub glued_key: bool,
}

impl EnvReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.warnings.is_empty() && !self.glued_key
    }
}

fn parse_keys(content: &str) -> HashMap<&str, &str> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            line.split_once('=')
        })
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}

/// Byte offset of a `MESA_PUBLIC_APP_URL=` occurrence glued onto the end of
/// the previous line, if any.
pub fn detect_glued_key(content: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(relative) = content[search_from..].find(GLUED_KEY) {
        let idx = search_from + relative;
        if idx > 0 {
            let before = content.as_bytes()[idx - 1];
            if before != b'\n' && before != b'\r' {
                return Some(idx);
            }
        }
        search_from = idx + GLUED_KEY.len();
    }
    None
}

/// Inserts the missing newline before the glued key. `None` when the file
/// does not exhibit the corruption.
pub fn repair_glued_key(content: &str) -> Option<String> {
    let idx = detect_glued_key(content)?;
    let mut fixed = String::with_capacity(content.len() + 1);
    fixed.push_str(&content[..idx]);
    fixed.push('\n');
    fixed.push_str(&content[idx..]);
    Some(fixed)
}

/// Validates key presence and value plausibility without touching the file.
pub fn check_content(content: &str) -> EnvReport {
    let keys = parse_keys(content);
    let mut report = EnvReport {
        glued_key: detect_glued_key(content).is_some(),
        ..EnvReport::default()
    };

    for key in REQUIRED_KEYS {
        match keys.get(key) {
            None | Some(&"") => report.missing.push(key),
            Some(value) => {
                if key.contains("SECRET_KEY") && !value.starts_with("sk_") {
                    report
                        .warnings
                        .push(format!("{key} looks invalid (expected an sk_ prefix)"));
                }
                if key.contains("WEBHOOK_SECRET") && !value.starts_with("whsec_") {
                    report
                        .warnings
                        .push(format!("{key} looks invalid (expected a whsec_ prefix)"));
                }
                if key.ends_with("_URL") && !value.starts_with("http") {
                    report
                        .warnings
                        .push(format!("{key} looks invalid (expected a URL)"));
                }
            }
        }
    }

    report
}

/// Checks `path`, printing findings; with `fix`, rewrites the file when the
/// glued-key corruption is present.
pub fn run(path: &Path, fix: bool) -> Result<(), std::io::Error> {
    let content = fs::read_to_string(path)?;
    let report = check_content(&content);

    for key in &report.missing {
        println!("missing: {key}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    if report.glued_key {
        println!("corruption detected: {GLUED_KEY} glued onto the previous line");
        if fix {
            if let Some(fixed) = repair_glued_key(&content) {
                fs::write(path, fixed)?;
                println!("repaired: {}", path.display());
            }
        } else {
            println!("re-run with --fix to repair");
        }
    }

    if report.is_clean() {
        println!("environment file looks good ({} keys checked)", REQUIRED_KEYS.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CLEAN: &str = "\
MESA_BILLING_SECRET_KEY=sk_test_123
MESA_WEBHOOK_SECRET=whsec_abc
MESA_SERVICE_ROLE_KEY=service-role
MESA_PUBLIC_PROJECT_URL=https://project.directory.example
MESA_PUSH_DISPATCH_URL=https://push.internal/dispatch
MESA_PUBLIC_APP_URL=https://app.mesa.example
";

    #[test]
    fn test_clean_file_passes() {
        let report = check_content(CLEAN);
        assert!(report.is_clean(), "unexpected findings: {report:?}");
    }

    #[test]
    fn test_missing_and_implausible_keys_reported() {
        let content = "\
MESA_BILLING_SECRET_KEY=not-a-secret
MESA_WEBHOOK_SECRET=whsec_abc
MESA_PUBLIC_PROJECT_URL=https://project.directory.example
MESA_PUSH_DISPATCH_URL=ftp://wrong
";
        let report = check_content(content);
        assert_eq!(report.missing, vec!["MESA_SERVICE_ROLE_KEY"]);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("MESA_BILLING_SECRET_KEY"));
        assert!(report.warnings[1].contains("MESA_PUSH_DISPATCH_URL"));
    }

    #[test]
    fn test_glued_key_detected_and_repaired() {
        let corrupted = "MESA_WEBHOOK_SECRET=whsec_abcMESA_PUBLIC_APP_URL=https://app.mesa.example\n";

        let idx = detect_glued_key(corrupted).expect("corruption not detected");
        assert_eq!(&corrupted[idx..idx + GLUED_KEY.len()], GLUED_KEY);

        let fixed = repair_glued_key(corrupted).unwrap();
        assert_eq!(
            fixed,
            "MESA_WEBHOOK_SECRET=whsec_abc\nMESA_PUBLIC_APP_URL=https://app.mesa.example\n"
        );
        // A repaired file no longer reports the corruption
        assert!(detect_glued_key(&fixed).is_none());
    }

    #[test]
    fn test_key_at_line_start_is_not_corruption() {
        assert!(detect_glued_key(CLEAN).is_none());
        assert!(detect_glued_key("MESA_PUBLIC_APP_URL=first-line\n").is_none());
    }

    #[test]
    fn test_run_repairs_file_in_place() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "A=1MESA_PUBLIC_APP_URL=https://app.mesa.example").unwrap();

        run(tmp.path(), true).unwrap();

        let repaired = std::fs::read_to_string(tmp.path()).unwrap();
        assert_eq!(repaired, "A=1\nMESA_PUBLIC_APP_URL=https://app.mesa.example");
    }
}
