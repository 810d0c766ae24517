//! Markdown building blocks.

/// Make text safe for a single table cell
pub fn cell(text: &str) -> String {
    text.replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pipe table with the first row as header
pub fn table(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let line = |row: &[String]| {
        let cells: Vec<String> = (0..width)
            .map(|i| row.get(i).map(|c| cell(c)).unwrap_or_default())
            .collect();
        format!("| {} |\n", cells.join(" | "))
    };

    let mut output = line(header);
    output.push_str(&format!("|{}\n", "---|".repeat(width)));
    for row in body {
        output.push_str(&line(row));
    }
    output
}

pub fn bullets(items: &[String]) -> String {
    items
        .iter()
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!("- {}\n", i.trim()))
        .collect()
}

pub fn numbered(items: &[String]) -> String {
    items
        .iter()
        .filter(|i| !i.trim().is_empty())
        .enumerate()
        .map(|(n, i)| format!("{}. {}\n", n + 1, i.trim()))
        .collect()
}

pub fn image(alt: &str, uri: &str) -> String {
    format!("![{}]({})\n", alt.replace(['[', ']'], ""), uri)
}

/// Exhibit label for the nth appendix chart: A, B, ...
pub fn exhibit_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_pads_short_rows() {
        let rows = vec![
            vec!["Metric".to_string(), "Value".to_string()],
            vec!["Margin".to_string()],
            vec!["CAC".to_string(), "$250 | est.".to_string()],
        ];
        let md = table(&rows);
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines[0], "| Metric | Value |");
        assert_eq!(lines[1], "|---|---|");
        assert_eq!(lines[2], "| Margin |  |");
        assert_eq!(lines[3], "| CAC | $250 \\| est. |");
    }

    #[test]
    fn test_lists_skip_blank_items() {
        let items = vec!["First".to_string(), "  ".to_string(), "Second".to_string()];
        assert_eq!(bullets(&items), "- First\n- Second\n");
        assert_eq!(numbered(&items), "1. First\n2. Second\n");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(table(&[]), "");
        assert_eq!(exhibit_letter(1), 'B');
    }
}
