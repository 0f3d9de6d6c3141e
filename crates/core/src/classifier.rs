use std::path::Path;

use crate::types::StrategyTag;

/// Office lock files ("~$report.docx") are never searched.
pub const TEMP_FILE_MARKER: &str = "~$";

const GZIP_SUFFIX: &str = ".gz";

const SKIPPED_EXTENSIONS: &[&str] = &[
    ".jpg", ".db", ".png", ".wbk", ".jpeg", ".pptx", ".shs", ".lnk", ".tmp", ".bmp", ".msg",
    ".vsd",
];

const PLAIN_TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".rtf", ".csv", ".mib", ".bat", ".sh", ".c", ".cpp", ".h", ".cs", ".html", ".htm",
    ".css", ".php", ".js", ".xml", ".ini", ".cfg", ".json", ".java", ".tex", ".rst", ".md", ".ps",
    ".nfo", ".info", ".py", ".yaml", ".toml",
];

const LOG_NAME_PREFIXES: &[&str] = &["messages", "syslog", "dmesg"];
const ROTATED_NAME_PREFIXES: &[&str] = &["dmesg.", "apt.txt."];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassification {
    /// Lower-cased, including the leading dot; empty when there is none.
    pub extension: String,
    pub is_log: bool,
    pub strategy: StrategyTag,
}

pub fn classify(path: &Path) -> StrategyTag {
    classify_file(path).strategy
}

pub fn classify_file(path: &Path) -> FileClassification {
    let name = file_name(path);
    let extension = extension_of(&name);

    if is_temp_file(&name) {
        return FileClassification {
            extension,
            is_log: false,
            strategy: StrategyTag::Skip,
        };
    }

    let is_log = is_log_name(&name);
    let strategy = if is_log {
        StrategyTag::LegacyLog
    } else {
        strategy_for_extension(&extension)
    };

    FileClassification {
        extension,
        is_log,
        strategy,
    }
}

pub fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_FILE_MARKER)
}

/// Filename heuristics for system and rotated application logs, with or
/// without a trailing `.gz`.
pub fn is_log(path: &Path) -> bool {
    is_log_name(&file_name(path))
}

fn is_log_name(name: &str) -> bool {
    let name = name.strip_suffix(GZIP_SUFFIX).unwrap_or(name);

    LOG_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
        || name.to_lowercase().contains(".log")
        || has_numeric_suffix(name)
        || ROTATED_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// "app.log.3", "file.7": the last dot-segment is all decimal digits.
/// A leading dot alone ("`.7`") is a hidden file, not an extension.
fn has_numeric_suffix(name: &str) -> bool {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let segment = &name[idx + 1..];
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

fn strategy_for_extension(extension: &str) -> StrategyTag {
    if SKIPPED_EXTENSIONS.contains(&extension) {
        return StrategyTag::Skip;
    }
    if PLAIN_TEXT_EXTENSIONS.contains(&extension) {
        return StrategyTag::PlainText;
    }

    match extension {
        ".xls" => StrategyTag::LegacySpreadsheet,
        ".doc" | ".dot" => StrategyTag::LegacyDocument,
        ".docx" => StrategyTag::ModernDocumentDocx,
        ".docm" => StrategyTag::ModernDocumentDocm,
        ".xlsx" => StrategyTag::ModernSpreadsheet,
        ".pdf" => StrategyTag::Pdf,
        ".vsdx" => StrategyTag::Diagram,
        _ => StrategyTag::Skip,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_detection_table() {
        let cases: &[(&str, bool)] = &[
            ("messages", true),
            ("dmesg", true),
            ("syslog", true),
            ("messages.", true),
            ("messages.gz", true),
            ("dmesg.gz", true),
            ("syslog.gz", true),
            ("messages.33", true),
            ("myfile.33", true),
            ("myfile.33.gz", true),
            ("dpkg.log.20191201.1575181021.gz", true),
            ("apt.txt.20221212.0", true),
            ("dmesg.0", true),
            ("dmesg.1.gz", true),
            ("dpkg.log", true),
            ("dpkg.log.1", true),
            ("dpkg.log.20220902.1662135421", true),
            ("mcadapter.log.Fri", true),
            ("turbine.log-2020-02-28-10-1.gz", true),
            ("wsrunner_RenderXBrowserAPI.log-2019-03-15-13-1.gz", true),
            ("messages.99.gz", true),
            ("syslog.20220811.1660267021.gz", true),
            ("jessie.blog", false),
        ];

        for (name, expected) in cases {
            let path = Path::new("/tmp").join(name);
            assert_eq!(is_log(&path), *expected, "is_log({name})");
        }
    }

    #[test]
    fn logs_take_precedence_over_extension() {
        assert_eq!(classify(Path::new("/var/log/app.log.txt")), StrategyTag::LegacyLog);
        assert_eq!(classify(Path::new("backup.7")), StrategyTag::LegacyLog);
        assert_eq!(classify(Path::new("syslog.2.gz")), StrategyTag::LegacyLog);
        assert_eq!(classify(Path::new("report.LOG")), StrategyTag::LegacyLog);
    }

    #[test]
    fn temp_files_are_skipped() {
        let c = classify_file(Path::new("/docs/~$report.docx"));
        assert_eq!(c.strategy, StrategyTag::Skip);
        assert_eq!(c.extension, ".docx");
        assert_eq!(classify(Path::new("~$messages")), StrategyTag::Skip);
    }

    #[test]
    fn skip_set_and_unknown() {
        for name in ["photo.JPG", "deck.pptx", "legacy.vsd", "mail.msg", "a.exe", "noext"] {
            assert_eq!(classify(Path::new(name)), StrategyTag::Skip, "{name}");
        }
    }

    #[test]
    fn dispatch_by_extension() {
        let cases = [
            ("notes.txt", StrategyTag::PlainText),
            ("config.YAML", StrategyTag::PlainText),
            ("main.cpp", StrategyTag::PlainText),
            ("book.xls", StrategyTag::LegacySpreadsheet),
            ("letter.doc", StrategyTag::LegacyDocument),
            ("template.dot", StrategyTag::LegacyDocument),
            ("report.docx", StrategyTag::ModernDocumentDocx),
            ("macro.docm", StrategyTag::ModernDocumentDocm),
            ("sheet.xlsx", StrategyTag::ModernSpreadsheet),
            ("manual.PDF", StrategyTag::Pdf),
            ("network.vsdx", StrategyTag::Diagram),
        ];

        for (name, expected) in cases {
            assert_eq!(classify(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn plain_gz_archive_is_skipped() {
        let c = classify_file(Path::new("bundle.tar.gz"));
        assert!(!c.is_log);
        assert_eq!(c.strategy, StrategyTag::Skip);
    }

    #[test]
    fn classification_is_pure() {
        let path = Path::new("/srv/logs/turbine.log-2020-02-28-10-1.gz");
        assert_eq!(classify_file(path), classify_file(path));
    }

    #[test]
    fn hidden_files_have_no_extension() {
        assert_eq!(extension_of(".bashrc"), "");
        assert!(!has_numeric_suffix(".7"));
    }
}
