// Parcel list import (CSV/TSV) and result export

use std::io::{Read, Write};
use std::path::Path;

use parcelgrid_recon::{AreaValue, ParcelInput, ReconciliationResult};

use crate::error::IoError;
use crate::text::format_area;

/// Read a two-column parcel list (label, area) from a file.
pub fn read_parcels(path: &Path) -> Result<Vec<ParcelInput>, IoError> {
    let content = read_file_as_utf8(path)?;
    parse_parcels(&content)
}

/// Parse a parcel list. The delimiter is sniffed; a leading header row is
/// skipped when its area column is text rather than a number.
///
/// With a non-comma delimiter, a decimal comma in the area column ("12,5") is
/// accepted as a decimal point.
pub fn parse_parcels(content: &str) -> Result<Vec<ParcelInput>, IoError> {
    let delimiter = sniff_delimiter(content);
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut parcels = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let label = record.get(0).unwrap_or("");
        let area = record.get(1).unwrap_or("");

        if label.is_empty() && area.is_empty() && record.len() <= 2 {
            continue;
        }
        if idx == 0 && is_header(label, area) {
            log::debug!("skipping header row: {label:?}, {area:?}");
            continue;
        }

        let raw_area = if delimiter != b',' {
            AreaValue::parse(&area.replace(',', "."))
        } else {
            AreaValue::parse(area)
        };
        parcels.push(ParcelInput {
            label: label.to_string(),
            raw_area,
        });
    }

    log::debug!(
        "parsed {} parcel row(s) with delimiter {:?}",
        parcels.len(),
        delimiter as char
    );
    Ok(parcels)
}

/// Leading words of a label column heading.
const HEADER_WORDS: &[&str] = &["parcel", "parcels", "label", "lot", "no", "nr", "number", "id", "name"];

/// A header row has a non-numeric area and either a heading-like label
/// ("Parcel No.", "Label") or text in the area column ("Area").
fn is_header(label: &str, area: &str) -> bool {
    if AreaValue::parse(area) != AreaValue::Invalid {
        return false;
    }
    let first_word = label
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("")
        .to_lowercase();
    HEADER_WORDS.contains(&first_word.as_str()) || area.chars().any(|c| c.is_alphabetic())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins; earlier candidates win ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source: std::io::Error| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;
    Ok(decode(bytes))
}

/// UTF-8 first; on failure fall back to Windows-1252 (common for Excel-exported CSVs).
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::warn!("input is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Write the reconciled table as CSV with a trailing TOTAL row.
pub fn write_result<W: Write>(
    result: &ReconciliationResult,
    decimals: usize,
    writer: W,
) -> Result<(), IoError> {
    let mut writer = ::csv::Writer::from_writer(writer);
    writer.write_record(["label", "adjusted_area", "rounded_area"])?;
    for row in &result.rows {
        writer.write_record([
            row.label.as_str(),
            &format_area(row.adjusted_area, decimals),
            &row.rounded_area.to_string(),
        ])?;
    }
    writer.write_record([
        "TOTAL",
        &format_area(result.total_adjusted_area, decimals),
        &result.total_rounded_area.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Blank parcel list with labels 1..=count, ready to be filled in.
pub fn write_template<W: Write>(count: usize, writer: W) -> Result<(), IoError> {
    let mut writer = ::csv::Writer::from_writer(writer);
    writer.write_record(["parcel", "area"])?;
    for i in 1..=count {
        writer.write_record([i.to_string().as_str(), ""])?;
    }
    writer.flush()?;
    Ok(())
}
