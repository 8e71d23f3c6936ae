//! Minimal CSV line codec

/// CSV dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub quote: char,
    /// First line is a header row
    pub header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            header: true,
        }
    }
}

/// Quote a field if it contains the delimiter, the quote character, or a line break
pub fn quote_field(value: &str, opts: &CsvOptions) -> String {
    let q = opts.quote;
    let needs_quoting = value.contains(opts.delimiter)
        || value.contains(q)
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace(q, &format!("{}{}", q, q));
        format!("{}{}{}", q, escaped, q)
    } else {
        value.to_string()
    }
}

/// Join fields into one line
pub fn format_line<S: AsRef<str>>(fields: &[S], opts: &CsvOptions) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref(), opts))
        .collect::<Vec<_>>()
        .join(&opts.delimiter.to_string())
}

/// Group the physical lines of a file into logical records.
///
/// A quoted field may contain line breaks, so a record continues onto the next
/// line while a quote is open. Each record comes with the 1-based number of the
/// line it starts on and without its trailing line break. An unterminated
/// quote at the end of the input yields the rest of the file as one record.
pub fn split_records(content: &str, opts: &CsvOptions) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut start = 1;
    let mut open = false;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        if current.is_empty() {
            start = index + 1;
        }
        // Doubled quotes toggle twice, leaving the state unchanged.
        if line.chars().filter(|c| *c == opts.quote).count() % 2 == 1 {
            open = !open;
        }
        current.push_str(line);
        if !open {
            let record = current.trim_end_matches(|c| c == '\n' || c == '\r');
            records.push((start, record.to_string()));
            current.clear();
        }
    }
    if !current.is_empty() {
        records.push((start, current));
    }
    records
}

/// Split one line into fields, honouring quotes and doubled-quote escapes.
///
/// Returns `None` for an unterminated quote or stray text after a closing quote.
pub fn parse_line(line: &str, opts: &CsvOptions) -> Option<Vec<String>> {
    let (q, d) = (opts.quote, opts.delimiter);
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut field = String::new();
        if chars.peek() == Some(&q) {
            chars.next();
            loop {
                match chars.next() {
                    Some(c) if c == q => {
                        if chars.peek() == Some(&q) {
                            chars.next();
                            field.push(q);
                        } else {
                            break;
                        }
                    }
                    Some(c) => field.push(c),
                    None => return None,
                }
            }
            fields.push(field);
            match chars.next() {
                Some(c) if c == d => continue,
                None => return Some(fields),
                Some(_) => return None,
            }
        }

        loop {
            match chars.next() {
                Some(c) if c == d => break,
                Some(c) => field.push(c),
                None => {
                    fields.push(field);
                    return Some(fields);
                }
            }
        }
        fields.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> CsvOptions {
        CsvOptions::default()
    }

    #[test]
    fn test_parse_simple_line() {
        assert_eq!(parse_line("1,Laptop,5", &opts()).unwrap(), vec!["1", "Laptop", "5"]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let fields = parse_line("H1,\"King Faisal, Kigali\",\"say \"\"hi\"\"\"", &opts()).unwrap();
        assert_eq!(fields, vec!["H1", "King Faisal, Kigali", "say \"hi\""]);
    }

    #[test]
    fn test_parse_empty_fields() {
        assert_eq!(parse_line("a,,", &opts()).unwrap(), vec!["a", "", ""]);
        assert_eq!(parse_line("", &opts()).unwrap(), vec![""]);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_line("\"open,b", &opts()).is_none());
        assert!(parse_line("\"a\"x,b", &opts()).is_none());
    }

    #[test]
    fn test_format_quotes_when_needed() {
        let line = format_line(&["1", "a,b", "plain"], &opts());
        assert_eq!(line, "1,\"a,b\",plain");
        assert_eq!(parse_line(&line, &opts()).unwrap(), vec!["1", "a,b", "plain"]);
    }

    #[test]
    fn test_split_records_joins_quoted_line_breaks() {
        let content = "id,name\r\n1,\"line one\nline two\"\n\n2,\"say \"\"hi\"\"\"\n";
        let records = split_records(content, &opts());
        assert_eq!(
            records,
            vec![
                (1, "id,name".to_string()),
                (2, "1,\"line one\nline two\"".to_string()),
                (4, String::new()),
                (5, "2,\"say \"\"hi\"\"\"".to_string()),
            ]
        );
        assert_eq!(
            parse_line(&records[1].1, &opts()).unwrap(),
            vec!["1", "line one\nline two"]
        );
    }

    #[test]
    fn test_split_records_unterminated_quote() {
        let records = split_records("id,name\n1,\"open\n2,b\n", &opts());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].0, 2);
        assert!(parse_line(&records[1].1, &opts()).is_none());
    }

    #[test]
    fn test_custom_delimiter() {
        let semi = CsvOptions {
            delimiter: ';',
            ..CsvOptions::default()
        };
        assert_eq!(parse_line("1;x,y", &semi).unwrap(), vec!["1", "x,y"]);
    }
}
