//! Plain-text renderings of a reconciliation result.
//!
//! - [`to_tsv`]: tab-separated table, pastes cleanly into spreadsheets.
//! - [`to_fixed_width`]: space-aligned table plus calculation summary, using
//!   only basic characters so it survives being pasted into CAD text objects.

use unicode_width::UnicodeWidthStr;

use parcelgrid_recon::ReconciliationResult;

pub const DEFAULT_TITLE: &str = "PARCEL CALCULATION TABLE";
pub const DEFAULT_FOOTER: &str = "Generated by Parcel Manager";
pub const DEFAULT_DECIMALS: usize = 2;

const COLUMN_HEADER: &str = "Parcel No.      New Area        Rounded Area";
const COLUMN_RULE: &str = "----------      --------        ------------";
const CLOSING_RULE_WIDTH: usize = 46;

#[derive(Debug, Clone)]
pub struct TextOptions {
    pub decimals: usize,
    pub title: String,
    pub footer: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            title: DEFAULT_TITLE.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

/// Fixed-point area, e.g. `501.00`.
///
/// Ties round away from zero, like the whole-number column, so `10.125` at two
/// decimals is `10.13` and `2.5` at zero decimals is `3`.
pub fn format_area(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    let rounded = if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    };
    format!("{rounded:.decimals$}")
}

/// Tab-separated table: header, one line per row, then the totals line.
pub fn to_tsv(result: &ReconciliationResult, decimals: usize) -> String {
    let mut out = String::from("Parcel Number\tNew Area\tRounded Area\n");
    for row in &result.rows {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            row.label,
            format_area(row.adjusted_area, decimals),
            row.rounded_area
        ));
    }
    out.push_str(&format!(
        "Total:\t{}\t{}\n",
        format_area(result.total_adjusted_area, decimals),
        result.total_rounded_area
    ));
    out
}

/// Space-aligned table with a calculation summary and status line.
pub fn to_fixed_width(result: &ReconciliationResult, opts: &TextOptions) -> String {
    let mut out = String::new();

    out.push_str(&opts.title);
    out.push('\n');
    out.push_str(&"=".repeat(display_width(&opts.title)));
    out.push_str("\n\n");

    out.push_str(COLUMN_HEADER);
    out.push('\n');
    out.push_str(COLUMN_RULE);
    out.push('\n');

    for row in &result.rows {
        let label = pad_end(&pad_start(&row.label, 6), 10);
        let area = pad_end(&pad_start(&format_area(row.adjusted_area, opts.decimals), 8), 12);
        let rounded = pad_start(&row.rounded_area.to_string(), 8);
        out.push_str(&format!("{label}      {area}    {rounded}\n"));
    }

    out.push_str(COLUMN_RULE);
    out.push('\n');

    let total_label = pad_end("TOTAL:", 10);
    let total_area = pad_end(
        &pad_start(&format_area(result.total_adjusted_area, opts.decimals), 8),
        12,
    );
    let total_rounded = pad_start(&result.total_rounded_area.to_string(), 8);
    out.push_str(&format!("{total_label}      {total_area}    {total_rounded}\n"));
    out.push_str(&"=".repeat(CLOSING_RULE_WIDTH));
    out.push_str("\n\n");

    out.push_str("CALCULATION SUMMARY:\n");
    out.push_str("-------------------\n");
    out.push_str(&format!(
        "Absolute Difference: {}\n",
        format_area(result.absolute_difference, opts.decimals)
    ));
    out.push_str(&format!(
        "Permissible Error:   {}\n\n",
        format_area(result.permissible_error, opts.decimals)
    ));
    out.push_str(status_line(result));
    out.push('\n');

    if !opts.footer.is_empty() {
        out.push('\n');
        out.push_str(&opts.footer);
        out.push('\n');
    }
    out
}

pub fn status_line(result: &ReconciliationResult) -> &'static str {
    if result.exceeds_limit {
        "*** WARNING: Error exceeds permissible limits! ***"
    } else {
        "Status: Calculation within acceptable limits"
    }
}

/// One line for stderr after a run.
pub fn summary_line(result: &ReconciliationResult, decimals: usize) -> String {
    let verdict = if result.exceeds_limit {
        "exceeds permissible error, original areas kept".to_string()
    } else {
        format!("within tolerance, scaled by {:.6}", result.scale_factor)
    };
    format!(
        "{} parcel(s): difference {}, permissible {}: {verdict}",
        result.rows.len(),
        format_area(result.absolute_difference, decimals),
        format_area(result.permissible_error, decimals),
    )
}

/// Display width of a string, accounting for CJK double-width, emoji, etc.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Left-pad to `width` display columns. Longer strings are left intact.
fn pad_start(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - sw), s)
    }
}

/// Right-pad to `width` display columns. Longer strings are left intact.
fn pad_end(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}
