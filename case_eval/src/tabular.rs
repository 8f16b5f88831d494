//! A small, forgiving reader for comma-separated tables.
//!
//! It is not a full CSV implementation: the delimiter is fixed, and a quote
//! simply toggles the "inside quotes" state. What it does handle is the shape
//! of the reference tables in practice: quoted fields that contain commas, and
//! quoted fields that run over several physical lines.
//!
//! Malformed input never fails. Missing trailing fields become empty strings
//! and extra fields are dropped.

use log::{debug, warn};

pub const DELIMITER: char = ',';
pub const QUOTE: char = '"';
/// Left at the start of files saved as "CSV UTF-8" by spreadsheet programs.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// One logical row, as header -> value pairs in header order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::default();
        for (h, v) in pairs {
            r.insert(h, v);
        }
        r
    }

    /// The value under this header, or the empty string if there is no such header.
    pub fn get(&self, header: &str) -> &str {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, header: &str) -> bool {
        self.fields.iter().any(|(h, _)| h == header)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // A repeated header keeps its first position and takes the later value.
    fn insert(&mut self, header: &str, value: &str) {
        if let Some(elt) = self.fields.iter_mut().find(|(h, _)| h == header) {
            elt.1 = value.to_string();
        } else {
            self.fields.push((header.to_string(), value.to_string()));
        }
    }
}

/// Parses a whole table. The first physical line is the header row.
pub fn parse(text: &str) -> Vec<Record> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text).trim();
    if text.is_empty() {
        return vec![];
    }
    let mut lines = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l));

    let headers: Vec<String> = match lines.next() {
        Some(header_line) => split_fields(header_line),
        None => return vec![],
    };
    debug!("parse: headers: {:?}", headers);

    let mut res: Vec<Record> = Vec::new();
    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        let mut logical = line.to_string();
        while count_quotes(&logical) % 2 == 1 {
            match lines.next() {
                Some(next_line) => {
                    logical.push('\n');
                    logical.push_str(next_line);
                }
                None => {
                    warn!(
                        "parse: unterminated quote, the rest of the input ({} chars) was read as a single row",
                        logical.len()
                    );
                    break;
                }
            }
        }

        let values = split_fields(&logical);
        if values.is_empty() {
            continue;
        }
        let mut record = Record::default();
        for (idx, header) in headers.iter().enumerate() {
            let value = values.get(idx).map(|s| s.as_str()).unwrap_or("");
            record.insert(header, value);
        }
        res.push(record);
    }
    debug!("parse: {} logical rows", res.len());
    res
}

fn count_quotes(s: &str) -> usize {
    s.chars().filter(|c| *c == QUOTE).count()
}

/// Splits one logical row into trimmed fields.
fn split_fields(line: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                // Doubled quote inside a quoted field.
                chars.next();
                current.push(QUOTE);
            }
            QUOTE => {
                in_quotes = !in_quotes;
            }
            DELIMITER if !in_quotes => {
                result.push(clean_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    result.push(clean_field(&current));
    result
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unwrapped = trimmed
        .strip_prefix(QUOTE)
        .and_then(|s| s.strip_suffix(QUOTE))
        .unwrap_or(trimmed);
    unwrapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_with_multiline_summary() {
        let text = "Case,Title,Category,Summary\n1,\"Widget Recall\",\"Safety\",\"Line one\nLine two\"";
        let rows = parse(text);
        assert_eq!(
            rows,
            vec![Record::from_pairs(&[
                ("Case", "1"),
                ("Title", "Widget Recall"),
                ("Category", "Safety"),
                ("Summary", "Line one\nLine two"),
            ])]
        );
    }

    #[test]
    fn comma_inside_quotes() {
        let rows = parse("Case,Stakeholder\n2,\"a, b\"\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Stakeholder"), "a, b");
    }

    #[test]
    fn headers_are_trimmed_and_unquoted() {
        let rows = parse(" \"Case\" , \"Outcome\" \n1,Recall issued");
        let headers: Vec<&str> = rows[0].headers().collect();
        assert_eq!(headers, vec!["Case", "Outcome"]);
        assert_eq!(rows[0].get("Outcome"), "Recall issued");
    }

    #[test]
    fn every_header_present_and_no_extra_keys() {
        let text = "Case,Title,Category,Summary\n1,Short\n2,A,B,C,extra,more\n\n\n3,x,y,z\n";
        let rows = parse(text);
        assert_eq!(rows.len(), 3);
        for r in rows.iter() {
            assert_eq!(r.len(), 4);
            assert!(r.contains("Summary"));
            assert!(!r.contains("extra"));
        }
        assert_eq!(rows[0].get("Title"), "Short");
        assert_eq!(rows[0].get("Category"), "");
        assert_eq!(rows[1].get("Summary"), "C");
        assert_eq!(rows[2].get("Case"), "3");
    }

    #[test]
    fn blank_lines_inside_quotes_are_kept() {
        let text = "Case,Description\n1,\"first\n\nthird\"\n2,plain";
        let rows = parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Description"), "first\n\nthird");
        assert_eq!(rows[1].get("Description"), "plain");
    }

    #[test]
    fn windows_line_endings() {
        let text = "Case,Outcome\r\n1,\"Recall\r\nissued\"\r\n2,Fine\r\n";
        let rows = parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Outcome"), "Recall\nissued");
        assert_eq!(rows[1].get("Outcome"), "Fine");
    }

    #[test]
    fn doubled_quotes_become_literal() {
        let rows = parse("Case,Description\n1,\"say \"\"no\"\" twice\"");
        assert_eq!(rows[0].get("Description"), "say \"no\" twice");
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("  \n \n").is_empty());
        assert!(parse("Case,Title\n").is_empty());
    }

    #[test]
    fn unterminated_quote_swallows_the_rest() {
        let _ = env_logger::try_init();
        let text = "Case,Description\n1,\"never closed\n2,other\n3,last";
        let rows = parse(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Description"), "never closed\n2,other\n3,last");
    }

    #[test]
    fn bom_is_ignored() {
        let rows = parse("\u{FEFF}Case,Title,Category,Summary\n1,Widget Recall,Safety,s1\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].headers().next(), Some("Case"));
        assert_eq!(rows[0].get("Case"), "1");
        assert_eq!(rows[0].get("Title"), "Widget Recall");
    }

    #[test]
    fn unknown_header_reads_empty() {
        let rows = parse("Case\n7");
        assert_eq!(rows[0].get("Title"), "");
    }
}
