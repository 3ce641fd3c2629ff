//! `check` command: validate configuration and the import CSV offline.

use std::path::Path;

use metaloc_core::{AppConfig, ConfigError};
use metaloc_import::{missing_headers, read_locations, MAX_BATCH_SIZE};

const RULE: &str = "==================================================";

/// Result lines for one group of checks.
#[derive(Debug, Default)]
struct Section {
    lines: Vec<String>,
    failed: bool,
}

impl Section {
    fn pass(&mut self, message: impl AsRef<str>) {
        self.lines.push(format!("   \u{2713} PASS: {}", message.as_ref()));
    }

    fn warn(&mut self, message: impl AsRef<str>) {
        self.lines.push(format!("   ! WARN: {}", message.as_ref()));
    }

    fn fail(&mut self, message: impl AsRef<str>) {
        self.lines.push(format!("   \u{2717} FAIL: {}", message.as_ref()));
        self.failed = true;
    }

    fn note(&mut self, message: impl AsRef<str>) {
        self.lines.push(format!("   {}", message.as_ref()));
    }
}

/// Print every check and fail if any of them failed.
pub(crate) fn run_check(
    config_path: &Path,
    config: Result<AppConfig, ConfigError>,
) -> anyhow::Result<()> {
    println!("MetaLocator Configuration Check");
    println!("{RULE}");

    println!("\n1. Loading configuration from {}...", config_path.display());
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("   \u{2717} FAIL: {e}");
            anyhow::bail!("configuration check failed");
        }
    };
    let settings = config_checks(&config);
    print_section(&settings);

    println!("\n2. Verifying CSV file {}...", config.csv_path.display());
    let csv = csv_checks(&config.csv_path);
    print_section(&csv);

    println!("\n{RULE}");
    if settings.failed || csv.failed {
        anyhow::bail!("configuration check failed");
    }
    println!("All checks passed! \u{2713}");
    Ok(())
}

fn print_section(section: &Section) {
    for line in &section.lines {
        println!("{line}");
    }
}

fn config_checks(config: &AppConfig) -> Section {
    let mut section = Section::default();
    section.pass("Configuration structure is valid");
    section.note(format!("API base URL: {}", config.api_base_url));

    if config.batch_size > MAX_BATCH_SIZE {
        section.warn(format!(
            "batch_size {} exceeds the API maximum; {MAX_BATCH_SIZE} will be used",
            config.batch_size
        ));
    } else {
        section.note(format!("Batch size: {}", config.batch_size));
    }
    section.note(format!(
        "Delay between batches: {}s",
        config.rate_limit_delay.as_secs_f64()
    ));

    match config.require_item_id() {
        Ok(item_id) => section.pass(format!("Search interface id: {item_id}")),
        Err(e) => section.warn(format!("{e} (search is unavailable)")),
    }
    section
}

fn csv_checks(path: &Path) -> Section {
    let mut section = Section::default();

    let load = match read_locations(path) {
        Ok(load) => load,
        Err(e) => {
            section.fail(e.to_string());
            return section;
        }
    };

    let missing = missing_headers(&load.headers);
    if missing.is_empty() {
        section.pass("CSV headers include essential fields");
    } else {
        section.fail("CSV is missing essential headers");
        section.note(format!("Missing: {}", missing.join(", ")));
    }

    section.pass(format!("Found {} location(s) in CSV", load.records.len()));
    if !load.skipped.is_empty() {
        section.warn(format!(
            "{} row(s) have a mismatched column count and will be skipped",
            load.skipped.len()
        ));
    }
    section
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL_HEADER: &str = "Name,Address,City,State,Monday Hours,category1";

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn complete_csv_passes() {
        let file = csv_file(&format!(
            "{FULL_HEADER}\nBlue Door,1 Main St,Charleston,SC,9-5,Cafe\n"
        ));
        let section = csv_checks(file.path());
        assert!(!section.failed, "{:?}", section.lines);
        assert!(section
            .lines
            .iter()
            .any(|l| l.contains("Found 1 location(s) in CSV")));
    }

    #[test]
    fn missing_headers_fail_and_are_listed() {
        let file = csv_file("Name,City\nA,X\n");
        let section = csv_checks(file.path());
        assert!(section.failed);
        assert!(section
            .lines
            .iter()
            .any(|l| l.contains("Missing: Address, State, Monday Hours, category1")));
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let section = csv_checks(&dir.path().join("absent.csv"));
        assert!(section.failed);
        assert!(section.lines[0].contains("CSV file not found"));
    }

    #[test]
    fn skipped_rows_warn_without_failing() {
        let file = csv_file(&format!("{FULL_HEADER}\nA,B,C,D,E,F\nonly,three,cols\n"));
        let section = csv_checks(file.path());
        assert!(!section.failed);
        assert!(section.lines.iter().any(|l| l.contains("1 row(s)")));
    }
}
