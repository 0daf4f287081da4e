//! Plain-text tables for terminal output. Numeric cells are right-aligned,
//! everything else left-aligned; ANSI colour codes do not count toward width.

use std::fmt::Write as _;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(columns) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    let numeric: Vec<bool> = (0..columns)
        .map(|idx| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .filter(|cell| !cell.is_empty())
                .all(|cell| is_numeric(cell))
                && rows.iter().any(|row| row.get(idx).is_some_and(|c| !c.is_empty()))
        })
        .collect();

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &numeric));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, &numeric));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, &numeric));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(cells: &[String], widths: &[usize], numeric: &[bool]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        let cell = cell.replace(['\n', '\r', '\t'], " ");
        let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
        if idx > 0 {
            line.push_str("  ");
        }
        if numeric[idx] {
            line.push_str(&padding);
            line.push_str(&cell);
        } else {
            line.push_str(&cell);
            line.push_str(&padding);
        }
    }
    line.trim_end().to_string()
}

fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim().trim_end_matches('%');
    trimmed.parse::<f64>().is_ok() || is_numeric_range(trimmed)
}

// "60-90" style ranges, including a negative lower bound.
fn is_numeric_range(cell: &str) -> bool {
    let body = cell.strip_prefix('-').unwrap_or(cell);
    match body.split_once('-') {
        Some((low, high)) => low.parse::<f64>().is_ok() && high.parse::<f64>().is_ok(),
        None => false,
    }
}

fn display_width(value: &str) -> usize {
    let mut width = 0;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}
