//! Fixed-width rendering of table contents for failure messages

/// Render rows as a pipe table, each column padded to its widest cell.
///
/// ```text
/// | id | foo   |
/// | 1  | foo-1 |
/// ```
pub fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    render_line(&mut out, columns, &widths);
    for row in rows {
        render_line(&mut out, row, &widths);
    }
    out
}

fn render_line(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        out.push_str(&format!(" {:<width$} |", cell, width = width));
    }
    out.push('\n');
}
