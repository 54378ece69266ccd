//! Delimited-row splitting backed by the `csv` reader.

use crate::model::Item;
use crate::splitter::Parsed;

/// Options for [`crate::channel::Channel::split_csv`].
#[derive(Debug, Clone)]
pub struct SplitCsvOptions {
    /// Treat the first (post-skip) row as field names and emit `Map` records.
    pub header: bool,
    /// Number of leading lines dropped before parsing begins, applied before
    /// header detection.
    pub skip: usize,
    /// Cell delimiter byte.
    pub delimiter: u8,
}

impl Default for SplitCsvOptions {
    fn default() -> Self {
        Self {
            header: false,
            skip: 0,
            delimiter: b',',
        }
    }
}

impl SplitCsvOptions {
    /// Header-row mode.
    pub fn with_header(mut self) -> Self {
        self.header = true;
        self
    }

    /// Drop `n` leading lines.
    pub fn with_skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Use a non-comma delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Content remaining after dropping `skip` leading lines.
fn after_skipped_lines(content: &str, skip: usize) -> &str {
    let mut rest = content;
    for _ in 0..skip {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// Parse delimited content. Cells stay strings; with a header each row becomes
/// a `Map` keyed by the header names (missing trailing cells become `Null`),
/// without one each row is a `List` of cells. Blank lines are ignored, quoted
/// cells may contain delimiters, escaped quotes, and newlines.
pub(crate) fn parse(content: &str, options: &SplitCsvOptions) -> Parsed {
    let content = after_skipped_lines(content, options.skip);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.header)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let names: Option<Vec<String>> = if options.header {
        match reader.headers() {
            Ok(headers) => Some(headers.iter().map(str::to_string).collect()),
            Err(error) => return Parsed::truncated(Vec::new(), error.to_string()),
        }
    } else {
        None
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(error) => return Parsed::truncated(records, error.to_string()),
        };
        let record = match &names {
            Some(names) => Item::Map(
                names
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| {
                        let value = row
                            .get(idx)
                            .map(|cell| Item::Str(cell.to_string()))
                            .unwrap_or(Item::Null);
                        (name.clone(), value)
                    })
                    .collect(),
            ),
            None => Item::List(row.iter().map(|cell| Item::Str(cell.to_string())).collect()),
        };
        records.push(record);
    }

    Parsed::complete(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_cells_keep_delimiters_and_escapes() {
        let parsed = parse(r#"a,"b,c","say ""hi""""#, &SplitCsvOptions::default());
        assert!(parsed.error.is_none());
        assert_eq!(
            parsed.records,
            vec![Item::List(vec![
                Item::Str("a".into()),
                Item::Str("b,c".into()),
                Item::Str("say \"hi\"".into()),
            ])]
        );
    }

    #[test]
    fn quoted_cells_may_contain_newlines() {
        let parsed = parse("a,\"line1\nline2\"\nb,c", &SplitCsvOptions::default());
        assert!(parsed.error.is_none());
        assert_eq!(
            parsed.records,
            vec![
                Item::List(vec![Item::Str("a".into()), Item::Str("line1\nline2".into())]),
                Item::List(vec![Item::Str("b".into()), Item::Str("c".into())]),
            ]
        );
    }

    #[test]
    fn header_rows_become_maps() {
        let parsed = parse("x,y\n1,2\n3,4", &SplitCsvOptions::default().with_header());
        assert!(parsed.error.is_none());
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.records[0].get_field("x"),
            Some(&Item::Str("1".into()))
        );
        assert_eq!(
            parsed.records[1].get_field("y"),
            Some(&Item::Str("4".into()))
        );
    }

    #[test]
    fn short_rows_pad_missing_fields_with_null() {
        let parsed = parse("x,y\n1", &SplitCsvOptions::default().with_header());
        assert!(parsed.error.is_none());
        assert_eq!(parsed.records[0].get_field("y"), Some(&Item::Null));
    }

    #[test]
    fn skip_drops_lines_before_header_detection() {
        let parsed = parse("x,y\n1,2\n3,4", &SplitCsvOptions::default().with_skip(1));
        assert_eq!(
            parsed.records,
            vec![
                Item::List(vec![Item::Str("1".into()), Item::Str("2".into())]),
                Item::List(vec![Item::Str("3".into()), Item::Str("4".into())]),
            ]
        );
    }
}
