use terminal_size::{terminal_size, Height, Width};

/// Render rows as an ASCII table sized to the current terminal.
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    render_table_width(columns, rows, get_terminal_width())
}

/// Render rows as an ASCII table no wider than `termw` visible columns per line.
pub fn render_table_width(columns: &[&str], rows: &[Vec<String>], termw: usize) -> String {
    let cols: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(termw)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(termw); }
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 4);
    let sep = build_separator(&widths);
    out.push(fit_line_to_width(&sep, termw));
    out.push(fit_line_to_width(&build_row_header_colored(&cols, &widths), termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in rows {
        out.push(fit_line_to_width(&build_row(r, &widths), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out.join("\n")
}

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), Height(_h))) if w > 20 => (w - 4) as usize,
        _ => 100,
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(visible_len(&text)));
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&pad);
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&pad);
        }
        s.push_str(" |");
    }
    s
}

// Header cells are green; padding is computed on the visible width.
fn build_row_header_colored(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        s.push(' ');
        s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        s.push_str(&" ".repeat(w.saturating_sub(visible_len(&text))));
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if visible_len(s) <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    // drop escapes when cutting so a color never leaks past the cell
    strip_ansi(s).chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw { return s.to_string(); }
    let plain = strip_ansi(s);
    if maxw <= 3 { return "…".to_string(); }
    let budget = maxw - 3;
    let front = budget / 2;
    let back = budget - front;
    let chars: Vec<char> = plain.chars().collect();
    let head: String = chars[..front].iter().collect();
    let tail: String = chars[chars.len() - back..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Count visible chars, skipping ANSI CSI sequences.
pub(crate) fn visible_len(s: &str) -> usize { strip_ansi(s).chars().count() }

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() { break; }
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![vec!["1".to_string(), "Desk".to_string()], vec!["22".to_string(), "Chair".to_string()]];
        let t = strip_ansi(&render_table_width(&["ID", "Name"], &rows, 80));
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "+----+-------+");
        assert_eq!(lines[1], "| ID | Name  |");
        // numbers align right
        assert_eq!(lines[3], "|  1 | Desk  |");
        assert_eq!(lines[4], "| 22 | Chair |");
    }

    #[test]
    fn colored_cells_pad_by_visible_width() {
        let rows = vec![vec!["\x1b[32mOK\x1b[0m".to_string()]];
        let t = strip_ansi(&render_table_width(&["Status"], &rows, 80));
        assert!(t.contains("| OK     |"));
    }

    #[test]
    fn long_lines_are_elided() {
        let rows = vec![vec!["x".repeat(200)]];
        let t = render_table_width(&["Col"], &rows, 40);
        for line in t.lines() {
            assert!(visible_len(line) <= 40, "line too wide: {}", line);
        }
    }

    #[test]
    fn strip_ansi_removes_escapes() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m plain"), "red plain");
    }
}
