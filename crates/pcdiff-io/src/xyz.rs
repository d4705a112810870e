//! Whitespace-separated `<class> <x> <y> <z> [ignored...]` text.
//!
//! Parsing never fails. Short lines are dropped, malformed numbers become 0.
//! [`ParseReport`] records both so callers can tell a real zero from a bad token.

use pcdiff_core::{Point, PointCloud};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Minimum whitespace-separated tokens for a line to count as a point. Never below 4.
    pub min_columns: usize,
    /// Cap on rows recorded in the report (counts are never capped).
    pub report_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self { Self { min_columns: 4, report_limit: 1000 } }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MalformedRow {
    /// 1-based line number.
    pub line: usize,
    /// Token indices (0 = class, 1..=3 = x,y,z) that did not parse in full.
    pub columns: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    pub lines_total: usize,
    pub blank_lines: usize,
    pub short_line_count: usize,
    pub malformed_row_count: usize,
    /// 1-based line numbers of dropped lines, up to `report_limit`.
    pub short_lines: Vec<usize>,
    pub malformed_rows: Vec<MalformedRow>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.short_line_count == 0 && self.malformed_row_count == 0
    }
}

/// Parse labeled XYZ text into a cloud named `name`.
pub fn parse_xyz(text: &str, name: &str) -> PointCloud {
    parse_xyz_with(text, name, &ParseOptions::default()).0
}

/// Same cloud as [`parse_xyz`], plus diagnostics.
pub fn parse_xyz_with_report(text: &str, name: &str) -> (PointCloud, ParseReport) {
    parse_xyz_with(text, name, &ParseOptions::default())
}

pub fn parse_xyz_with(text: &str, name: &str, opts: &ParseOptions) -> (PointCloud, ParseReport) {
    // a leading BOM is an encoding marker, not part of the first token
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let min_columns = opts.min_columns.max(4);
    let mut report = ParseReport::default();
    let mut points = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        report.lines_total += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            report.blank_lines += 1;
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < min_columns {
            log::trace!("{name}:{lineno}: dropped line with {} column(s)", tokens.len());
            report.short_line_count += 1;
            if report.short_lines.len() < opts.report_limit {
                report.short_lines.push(lineno);
            }
            continue;
        }

        let (class_id, class_ok) = int_or_zero(tokens[0]);
        let (x, x_ok) = float_or_zero(tokens[1]);
        let (y, y_ok) = float_or_zero(tokens[2]);
        let (z, z_ok) = float_or_zero(tokens[3]);

        let bad: Vec<usize> = [class_ok, x_ok, y_ok, z_ok]
            .iter()
            .enumerate()
            .filter_map(|(i, ok)| if *ok { None } else { Some(i) })
            .collect();
        if !bad.is_empty() {
            log::trace!("{name}:{lineno}: malformed column(s) {bad:?}");
            report.malformed_row_count += 1;
            if report.malformed_rows.len() < opts.report_limit {
                report.malformed_rows.push(MalformedRow { line: lineno, columns: bad });
            }
        }

        points.push(Point::new(class_id, x, y, z));
    }

    let cloud = PointCloud::new(name, points);
    log::debug!(
        "parsed {name}: {} points from {} lines ({} blank, {} short, {} malformed)",
        cloud.len(), report.lines_total, report.blank_lines,
        report.short_line_count, report.malformed_row_count
    );
    (cloud, report)
}

/// Leading `[+-]?digits` prefix as i64; 0 when there is none or it overflows.
/// The flag is true only when the whole token was consumed.
fn int_or_zero(tok: &str) -> (i64, bool) {
    let b = tok.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) { i += 1; }
    let digits_start = i;
    while i < b.len() && b[i].is_ascii_digit() { i += 1; }
    if i == digits_start { return (0, false); }
    match tok[..i].parse::<i64>() {
        Ok(v) => (v, i == b.len()),
        Err(_) => (0, false),
    }
}

/// Leading decimal-float prefix as f64, else 0. Same flag semantics as [`int_or_zero`].
fn float_or_zero(tok: &str) -> (f64, bool) {
    let b = tok.as_bytes();
    let digits = |mut i: usize| { while i < b.len() && b[i].is_ascii_digit() { i += 1; } i };

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) { i += 1; }
    let int_end = digits(i);
    let mut end = int_end;
    let mut mantissa_digits = int_end - i;
    if end < b.len() && b[end] == b'.' {
        let frac_end = digits(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 { return (0.0, false); }

    if end < b.len() && matches!(b[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') { j += 1; }
        let exp_end = digits(j);
        if exp_end > j { end = exp_end; }
    }

    match tok[..end].parse::<f64>() {
        Ok(v) => (v, end == b.len()),
        Err(_) => (0.0, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn two_points_bound_the_unit_cube() {
        let c = parse_xyz("1 0 0 0\n2 1 1 1\n", "a.xyz");
        assert_eq!(c.len(), 2);
        assert_eq!(c.name, "a.xyz");
        assert_eq!(c.bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(c.bounds.max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(c.center, Point3::new(0.5, 0.5, 0.5));
        assert_eq!(c.points[0].class_name(), "default");
        assert_eq!(c.points[1].class_name(), "ground");
    }

    #[test]
    fn empty_input_is_an_empty_cloud() {
        for text in ["", "\n\n", "   \n\t\n"] {
            let c = parse_xyz(text, "empty");
            assert!(c.is_empty());
            assert_eq!(c.bounds.min, Point3::new(0.0, 0.0, 0.0));
            assert_eq!(c.bounds.max, Point3::new(1.0, 1.0, 1.0));
            assert_eq!(c.center, Point3::new(0.5, 0.5, 0.5));
        }
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let (c, report) = parse_xyz_with_report("\u{feff}1 0 0 0\n2 1 1 1\n", "bom");
        assert_eq!(c.len(), 2);
        assert_eq!(c.points[0].class_id, 1);
        assert_eq!(c.points[0].class_name(), "default");
        assert!(report.is_clean());
    }

    #[test]
    fn short_lines_are_dropped() {
        let (c, report) = parse_xyz_with_report("1 0\n2 1 1 1\n3 4 5\n", "s");
        assert_eq!(c.len(), 1);
        assert_eq!(c.points[0].class_id, 2);
        assert_eq!(report.short_lines, vec![1, 3]);
        assert!(!report.is_clean());
    }

    #[test]
    fn bad_coordinate_becomes_zero() {
        let (c, report) = parse_xyz_with_report("1 abc 0 0", "m");
        assert_eq!(c.len(), 1);
        let p = &c.points[0];
        assert_eq!((p.class_id, p.x, p.y, p.z), (1, 0.0, 0.0, 0.0));
        assert_eq!(report.malformed_rows, vec![MalformedRow { line: 1, columns: vec![1] }]);
    }

    #[test]
    fn extra_columns_and_blank_lines_are_ignored() {
        let text = "\n  6 1.5 -2 3e1 255 255 0  \r\n\n7\t4\t5\t6\n";
        let (c, report) = parse_xyz_with_report(text, "x");
        assert_eq!(c.len(), 2);
        let p = &c.points[0];
        assert_eq!((p.class_id, p.x, p.y, p.z), (6, 1.5, -2.0, 30.0));
        assert_eq!(c.points[1].class_name(), "false_point");
        assert_eq!(report.blank_lines, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn numeric_prefixes_are_kept() {
        assert_eq!(int_or_zero("3"), (3, true));
        assert_eq!(int_or_zero("3abc"), (3, false));
        assert_eq!(int_or_zero("3.7"), (3, false));
        assert_eq!(int_or_zero("-2"), (-2, true));
        assert_eq!(int_or_zero("abc"), (0, false));
        assert_eq!(int_or_zero("99999999999999999999"), (0, false));

        assert_eq!(float_or_zero("1.5m"), (1.5, false));
        assert_eq!(float_or_zero("1e3"), (1000.0, true));
        assert_eq!(float_or_zero("2e"), (2.0, false));
        assert_eq!(float_or_zero(".5"), (0.5, true));
        assert_eq!(float_or_zero("-7."), (-7.0, true));
        assert_eq!(float_or_zero("nan"), (0.0, false));
        assert_eq!(float_or_zero("inf"), (0.0, false));
        assert_eq!(float_or_zero("."), (0.0, false));
    }

    #[test]
    fn unknown_class_gets_synthetic_name() {
        let c = parse_xyz("12 0 0 0\nfoo 0 0 0", "u");
        assert_eq!(c.points[0].class_name(), "class_12");
        assert_eq!(c.points[1].class_id, 0);
        assert_eq!(c.points[1].class_name(), "class_0");
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "1 0.25 3 -1\n4 8 8 8\nbad\n5 1 2 3 extra";
        let a = parse_xyz(text, "first");
        let b = parse_xyz(text, "second");
        assert_eq!(a.points, b.points);
        assert_eq!(a.bounds, b.bounds);
        assert_eq!(a.center, b.center);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn report_limit_caps_rows_not_counts() {
        let text = "x\n".repeat(10);
        let opts = ParseOptions { report_limit: 3, ..Default::default() };
        let (c, report) = parse_xyz_with(&text, "r", &opts);
        assert!(c.is_empty());
        assert_eq!(report.short_line_count, 10);
        assert_eq!(report.short_lines.len(), 3);
    }

    #[test]
    fn min_columns_can_require_more_but_not_less() {
        let text = "1 0 0 0\n2 0 0 0 9";
        let strict = ParseOptions { min_columns: 5, ..Default::default() };
        assert_eq!(parse_xyz_with(text, "s", &strict).0.len(), 1);
        let loose = ParseOptions { min_columns: 2, ..Default::default() };
        assert_eq!(parse_xyz_with("1 0\n1 0 0 0", "l", &loose).0.len(), 1);
    }
}
