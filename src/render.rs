use crate::types::{PackingResult, Row};

const MAX_WIDTH: f64 = 80.0;

/// ASCII picture of the rows, each one a strip scaled to `MAX_WIDTH` columns
/// with its segments boxed and labelled where the label fits.
pub fn render_rows(result: &PackingResult) -> String {
    let scale = MAX_WIDTH / result.row_length as f64;
    let grid_w = (result.row_length as f64 * scale).round() as usize;
    if grid_w == 0 || result.rows.is_empty() {
        return String::new();
    }

    let grid_h = result.rows.len() * 2;
    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    for (ri, row) in result.rows.iter().enumerate() {
        let y = ri * 2;
        draw_rect(&mut grid, 0, y, grid_w, 2);
        draw_segments(&mut grid, row, y, scale);
    }

    let mut out = String::new();
    for (i, line) in grid.iter().enumerate() {
        let prefix = if i % 2 == 1 {
            format!("Row {:>2} ", i / 2 + 1)
        } else {
            " ".repeat(7)
        };
        let line: String = line.iter().collect();
        out.push_str(&prefix);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn draw_segments(grid: &mut [Vec<char>], row: &Row, y: usize, scale: f64) {
    let mut offset = 0u64;
    for piece in &row.pieces {
        let sx = (offset as f64 * scale).round() as usize;
        let ex = ((offset + piece.length as u64) as f64 * scale).round() as usize;
        offset += piece.length as u64;
        if ex <= sx {
            continue;
        }
        draw_rect(grid, sx, y, ex - sx, 2);

        let inner = ex - sx - 1;
        let label: Vec<char> = piece.label.chars().collect();
        let shown = if label.len() <= inner {
            label
        } else if inner >= 2 {
            let mut cut: Vec<char> = label[..inner - 1].to_vec();
            cut.push('~');
            cut
        } else {
            continue;
        };
        let start = sx + 1 + (inner - shown.len()) / 2;
        for (i, ch) in shown.into_iter().enumerate() {
            grid[y + 1][start + i] = ch;
        }
    }
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    for i in x..=x + w {
        for j in [y, y + h] {
            if i < cols && j < rows && grid[j][i] != '+' {
                grid[j][i] = if grid[j][i] == '|' { '+' } else { '-' };
            }
        }
    }

    for j in y..=y + h {
        for i in [x, x + w] {
            if i < cols && j < rows && grid[j][i] != '+' {
                grid[j][i] = if grid[j][i] == '-' { '+' } else { '|' };
            }
        }
    }

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

/// Row-by-row segment listing as CSV: `row,segment_label,length_in,crop`.
pub fn to_csv(result: &PackingResult) -> String {
    let mut out = String::from("row,segment_label,length_in,crop\n");
    for (ri, row) in result.rows.iter().enumerate() {
        for piece in &row.pieces {
            out.push_str(&format!(
                "{},{},{},{}\n",
                ri + 1,
                csv_field(&piece.label),
                piece.length,
                csv_field(&piece.crop)
            ));
        }
    }
    out
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;
    use std::collections::BTreeMap;

    fn result(rows: Vec<Vec<Piece>>) -> PackingResult {
        let rows: Vec<Row> = rows.into_iter().map(|pieces| Row { pieces }).collect();
        let pieces: Vec<Piece> = rows.iter().flat_map(|r| r.pieces.clone()).collect();
        let total_length: u64 = pieces.iter().map(|p| p.length as u64).sum();
        let capacity = 360 * rows.len() as u64;
        PackingResult {
            scaled_counts: BTreeMap::new(),
            pieces,
            rows,
            row_length: 360,
            total_length,
            waste: capacity - total_length,
        }
    }

    #[test]
    fn test_render_labels_segments() {
        let r = result(vec![
            vec![Piece::new(240, "kale", "kale"), Piece::new(120, "garlic", "garlic")],
            vec![Piece::new(360, "corn#1", "corn")],
        ]);
        let output = render_rows(&r);
        assert!(output.contains("Row  1"));
        assert!(output.contains("Row  2"));
        assert!(output.contains("kale"));
        assert!(output.contains("garlic"));
        assert!(output.contains("corn#1"));
        assert!(output.contains('+'));
    }

    #[test]
    fn test_render_truncates_long_labels() {
        let r = result(vec![vec![
            Piece::new(20, "tomatoes (>50% paste)", "tomatoes (>50% paste)"),
            Piece::new(340, "kale", "kale"),
        ]]);
        let output = render_rows(&r);
        assert!(output.contains('~'));
        assert!(!output.contains("tomatoes (>50% paste)"));
    }

    #[test]
    fn test_render_empty_rows() {
        let output = render_rows(&result(vec![vec![], vec![]]));
        assert_eq!(output.lines().count(), 5);
    }

    #[test]
    fn test_csv_quotes_commas() {
        let r = result(vec![vec![Piece::new(300, "corn, sweet#1", "corn, sweet")]]);
        let csv = to_csv(&r);
        assert_eq!(
            csv,
            "row,segment_label,length_in,crop\n1,\"corn, sweet#1\",300,\"corn, sweet\"\n"
        );
    }
}
