use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::ean;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Used when sniffing finds no candidate at all.
pub const DEFAULT_DELIMITER: u8 = b';';

const SNIFF_BYTES: usize = 1024;
const SNIFF_LINES: usize = 10;
const CANDIDATES: [u8; 4] = [b';', b',', b'\t', b'|'];

/// A data row that was not imported.
#[derive(Debug)]
pub struct RowIssue {
    pub line: u64,
    pub error: Error,
}

#[derive(Debug)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<RowIssue>,
    pub delimiter: u8,
    /// The header's EAN column held only digits, so the file may have had no
    /// header and its first row was read as one.
    pub numeric_header: bool,
}

/// Import `brand, product, EAN` rows (first three columns by position).
///
/// The first record must be a header. Structural problems abort the whole
/// file before the registry is touched; bad individual rows are skipped and
/// listed in the report.
pub fn import_csv(registry: &mut Registry, path: &Path) -> Result<ImportReport> {
    let bytes = fs::read(path).map_err(|source| Error::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    import_csv_str(registry, &text, path)
}

/// Same as [`import_csv`] for text already in memory; `origin` is only used
/// in error messages.
pub fn import_csv_str(registry: &mut Registry, text: &str, origin: &Path) -> Result<ImportReport> {
    let text = text.trim_start_matches('\u{feff}');
    let malformed = |reason: String| Error::MalformedCsv {
        path: origin.to_path_buf(),
        reason,
    };

    let delimiter = sniff_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        None => return Err(malformed("file is empty".into())),
        Some(Err(e)) => return Err(malformed(e.to_string())),
        Some(Ok(h)) => h,
    };
    if header.len() < 3 {
        return Err(malformed(format!(
            "header has {} column(s), expected brand, product and EAN",
            header.len()
        )));
    }
    if ean::is_valid(&header[2]) {
        return Err(malformed(format!(
            "no header row (first line already holds EAN {})",
            &header[2]
        )));
    }
    let numeric_header = !header[2].is_empty() && header[2].bytes().all(|b| b.is_ascii_digit());
    if numeric_header {
        warn!(
            "{}: header column {:?} is numeric; if the file has no header row, its first row was not imported",
            origin.display(),
            &header[2]
        );
    }

    let mut rows: Vec<(String, String, String)> = Vec::new();
    let mut skipped = Vec::new();
    for result in records {
        let record = result.map_err(|e| malformed(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < 3 {
            skipped.push(RowIssue {
                line,
                error: malformed(format!("line {line} has {} column(s)", record.len())),
            });
            continue;
        }
        if let Err(error) = ean::validate(&record[2]) {
            skipped.push(RowIssue { line, error });
            continue;
        }
        rows.push((record[2].to_string(), record[1].to_string(), record[0].to_string()));
    }

    let mut imported = 0;
    for (code, product, brand) in rows {
        registry.add_code(&code, &product, &brand)?;
        imported += 1;
    }
    for issue in &skipped {
        warn!("{}: line {} skipped: {}", origin.display(), issue.line, issue.error);
    }
    info!(
        "imported {imported} code(s) from {} (delimiter {:?}, {} skipped)",
        origin.display(),
        delimiter as char,
        skipped.len()
    );
    Ok(ImportReport {
        imported,
        skipped,
        delimiter,
        numeric_header,
    })
}

/// Guess the field delimiter from the start of the file.
///
/// A candidate wins when it occurs the same non-zero number of times on every
/// sampled line (outside quotes); the highest such count wins, ties go to the
/// earlier candidate. Without a consistent candidate the most frequent one on
/// the first line is used, and `;` when there is none.
pub fn sniff_delimiter(text: &str) -> u8 {
    let mut cut = text.len().min(SNIFF_BYTES);
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let sample = &text[..cut];
    let mut lines: Vec<&str> = sample.lines().filter(|l| !l.trim().is_empty()).collect();
    // The last line is probably cut in half.
    if cut < text.len() && lines.len() > 1 {
        lines.pop();
    }
    lines.truncate(SNIFF_LINES);
    let Some(first) = lines.first() else {
        return DEFAULT_DELIMITER;
    };

    let mut best: Option<(u8, usize)> = None;
    for &d in &CANDIDATES {
        let n = count_outside_quotes(first, d);
        if n == 0 || !lines.iter().all(|l| count_outside_quotes(l, d) == n) {
            continue;
        }
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((d, n));
        }
    }
    if let Some((d, _)) = best {
        return d;
    }

    let mut fallback: Option<(u8, usize)> = None;
    for &d in &CANDIDATES {
        let n = count_outside_quotes(first, d);
        if n > 0 && fallback.is_none_or(|(_, m)| n > m) {
            fallback = Some((d, n));
        }
    }
    fallback.map(|(d, _)| d).unwrap_or(DEFAULT_DELIMITER)
}

fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut n = 0;
    for b in line.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ImageSlot;
    use std::path::PathBuf;

    fn memory_origin() -> PathBuf {
        PathBuf::from("<memory>")
    }

    fn registry() -> Registry {
        Registry::new("/assets/placeholder.png")
    }

    #[test]
    fn imports_single_row_by_position() {
        let mut reg = registry();
        let report = import_csv_str(
            &mut reg,
            "Marke;Artikel;Code\nAcme;Widget;1234567890123\n",
            &memory_origin(),
        )
        .unwrap();
        assert_eq!(report.imported, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.delimiter, b';');
        assert_eq!(reg.len(), 1);
        let e = reg.get("1234567890123").unwrap();
        assert_eq!(e.product, "Widget");
        assert_eq!(e.brand, "Acme");
        assert!(e.uses_placeholder(ImageSlot::Product, reg.placeholder()));
        assert!(e.uses_placeholder(ImageSlot::Model, reg.placeholder()));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let mut reg = registry();
        import_csv_str(
            &mut reg,
            "brand,product,ean,price\nAcme,Widget,1234567890123,9.99\n",
            &memory_origin(),
        )
        .unwrap();
        assert_eq!(reg.get("1234567890123").unwrap().brand, "Acme");
    }

    #[test]
    fn empty_file_is_malformed_and_registry_stays_empty() {
        let mut reg = registry();
        let err = import_csv_str(&mut reg, "", &memory_origin()).unwrap_err();
        assert!(matches!(err, Error::MalformedCsv { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn header_with_too_few_columns_aborts_without_mutation() {
        let mut reg = registry();
        reg.add_code("1111111111111", "Old", "Brand").unwrap();
        let err = import_csv_str(&mut reg, "brand;product\nAcme;Widget\n", &memory_origin()).unwrap_err();
        assert!(matches!(err, Error::MalformedCsv { .. }));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("1111111111111").unwrap().product, "Old");
    }

    #[test]
    fn file_without_header_row_is_rejected() {
        let mut reg = registry();
        let err = import_csv_str(
            &mut reg,
            "Acme;Widget;1234567890123\nAcme;Gadget;1234567890124\n",
            &memory_origin(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedCsv { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn numeric_header_with_bad_code_is_flagged() {
        let mut reg = registry();
        let report = import_csv_str(
            &mut reg,
            "Acme;Widget;12345\nAcme;Gadget;1234567890123\n",
            &memory_origin(),
        )
        .unwrap();
        assert!(report.numeric_header);
        assert_eq!(report.imported, 1);
        assert!(reg.get("1234567890123").is_some());
    }

    #[test]
    fn text_header_is_not_flagged() {
        let mut reg = registry();
        let report = import_csv_str(&mut reg, "b;p;EAN\nAcme;Widget;1234567890123\n", &memory_origin()).unwrap();
        assert!(!report.numeric_header);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let mut reg = registry();
        let text = "brand;product;ean\nAcme;Widget;1234567890123\nAcme;Broken;12345\nShort;Row\n;;\nGlobex;Gadget;9876543210987\n";
        let report = import_csv_str(&mut reg, text, &memory_origin()).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(report.skipped[0].error, Error::InvalidEan { .. }));
        assert_eq!(report.skipped[0].line, 3);
        assert!(matches!(report.skipped[1].error, Error::MalformedCsv { .. }));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn last_row_wins_on_duplicate_code() {
        let mut reg = registry();
        import_csv_str(
            &mut reg,
            "b;p;e\nAcme;First;1234567890123\nAcme;Second;1234567890123\n",
            &memory_origin(),
        )
        .unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("1234567890123").unwrap().product, "Second");
    }

    #[test]
    fn fields_are_trimmed_and_quotes_respected() {
        let mut reg = registry();
        import_csv_str(
            &mut reg,
            "brand,product,ean\n\"Acme, Inc.\",\"Widget; large\",  1234567890123 \n",
            &memory_origin(),
        )
        .unwrap();
        let e = reg.get("1234567890123").unwrap();
        assert_eq!(e.brand, "Acme, Inc.");
        assert_eq!(e.product, "Widget; large");
    }

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
    }

    #[test]
    fn sniff_prefers_consistent_candidate() {
        // Commas appear in the product names but not on every line.
        let text = "brand;product;ean\nAcme;Widget, blue;1234567890123\nAcme;Gadget;1234567890124\n";
        assert_eq!(sniff_delimiter(text), b';');
    }

    #[test]
    fn sniff_falls_back_to_semicolon() {
        assert_eq!(sniff_delimiter(""), DEFAULT_DELIMITER);
        assert_eq!(sniff_delimiter("single column\n"), DEFAULT_DELIMITER);
    }

    #[test]
    fn missing_file_is_reported() {
        let mut reg = registry();
        let err = import_csv(&mut reg, Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }

    #[test]
    fn reads_from_disk_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.csv");
        fs::write(&path, "\u{feff}Brand,Product,EAN\r\nAcme,Widget,1234567890123\r\n").unwrap();
        let mut reg = registry();
        let report = import_csv(&mut reg, &path).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.delimiter, b',');
        assert_eq!(reg.get("1234567890123").unwrap().product, "Widget");
    }
}
