#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN_WIDTH: usize = 4;
const SEPARATOR: &str = "  ";

/// Render an aligned plain-text table.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN_WIDTH)
        })
        .collect::<Vec<_>>();

    if let Some(max_width) = options.max_width {
        shrink_to_fit(&mut widths, max_width);
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map_or("-", String::as_str);
                let text = truncate(cell, *width);
                let padded = pad(&text, *width, is_numeric(&text));
                if options.color {
                    highlight(&text, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        lines.push(line);
    }
    lines.join("\n")
}

/// Narrow the widest column one character at a time until the row fits.
fn shrink_to_fit(widths: &mut [usize], max_width: usize) {
    let separators = widths.len().saturating_sub(1) * SEPARATOR.len();
    while widths.iter().sum::<usize>() + separators > max_width {
        let Some((index, _)) = widths
            .iter()
            .enumerate()
            .filter(|(_, width)| **width > MIN_COLUMN_WIDTH)
            .max_by_key(|(_, width)| **width)
        else {
            break;
        };
        widths[index] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out = value.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '.'))
        && value.chars().any(|ch| ch.is_ascii_digit())
}

/// Color access and status words; padding is applied outside the escape codes.
fn highlight(text: &str, padded: String) -> String {
    let code = match text.to_ascii_lowercase().as_str() {
        "granted" | "render" | "active" | "true" | "authenticated" => "32",
        "loading" | "pending" | "inactive" => "33",
        "denied" | "access_denied" | "blocked" | "deleted" | "false" | "redirect_to_login" => "31",
        _ => return padded,
    };
    padded.replacen(text, &format!("\u{1b}[{code}m{text}\u{1b}[0m"), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["1".into(), "admin".into(), "Ada Lovelace".into()],
            vec!["200".into(), "finance".into(), "Grace Hopper".into()],
        ]
    }

    #[test]
    fn aligns_columns_and_divider() {
        let table = render_table(&["id", "role", "name"], &rows(), PLAIN);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[1].len(), lines[0].chars().count());
        // numeric ids are right-aligned
        assert!(lines[2].starts_with("   1"));
    }

    #[test]
    fn truncates_to_max_width() {
        let options = TableOptions {
            max_width: Some(24),
            color: false,
        };
        let table = render_table(&["id", "role", "name"], &rows(), options);
        for line in table.lines().skip(2) {
            assert!(line.chars().count() <= 24, "{line}");
        }
        assert!(table.contains('…'));
    }

    #[test]
    fn color_wraps_known_words_only() {
        let options = TableOptions {
            max_width: None,
            color: true,
        };
        let table = render_table(
            &["page", "access"],
            &[vec!["users".into(), "denied".into()]],
            options,
        );
        assert!(table.contains("\u{1b}[31mdenied\u{1b}[0m"));
        assert!(!table.contains("\u{1b}[31musers"));
    }
}
