//! FASTA entry splitting.

use crate::model::Item;
use crate::splitter::Parsed;

/// Which fields a FASTA `Map` record carries. Field order in the record is
/// fixed: `id`, `header`, `desc`, `sequence`.
#[derive(Debug, Clone, Copy)]
pub struct FastaRecordSpec {
    /// First whitespace-delimited token of the header line.
    pub id: bool,
    /// Full header line without the `>` marker.
    pub header: bool,
    /// Header remainder after the id token.
    pub desc: bool,
    /// Concatenated sequence lines, newlines removed.
    pub sequence: bool,
}

impl Default for FastaRecordSpec {
    fn default() -> Self {
        Self {
            id: true,
            header: false,
            desc: false,
            sequence: true,
        }
    }
}

impl FastaRecordSpec {
    /// Request every field.
    pub fn all() -> Self {
        Self {
            id: true,
            header: true,
            desc: true,
            sequence: true,
        }
    }
}

/// Options for [`crate::channel::Channel::split_fasta`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitFastaOptions {
    /// Emit `Map` records with the requested fields instead of raw text
    /// chunks.
    pub record: Option<FastaRecordSpec>,
}

impl SplitFastaOptions {
    /// Raw text chunks, one per entry.
    pub fn text() -> Self {
        Self { record: None }
    }

    /// `Map` records with the requested fields.
    pub fn record(spec: FastaRecordSpec) -> Self {
        Self { record: Some(spec) }
    }
}

struct Entry {
    header: String,
    sequence_lines: Vec<String>,
}

impl Entry {
    fn into_item(self, options: &SplitFastaOptions) -> Item {
        match options.record {
            None => {
                let mut chunk = format!(">{}", self.header);
                for line in &self.sequence_lines {
                    chunk.push('\n');
                    chunk.push_str(line);
                }
                Item::Str(chunk)
            }
            Some(spec) => {
                let mut pairs = Vec::new();
                let mut tokens = self.header.splitn(2, char::is_whitespace);
                let id = tokens.next().unwrap_or_default().to_string();
                let desc = tokens.next().unwrap_or_default().trim().to_string();
                if spec.id {
                    pairs.push(("id".to_string(), Item::Str(id)));
                }
                if spec.header {
                    pairs.push(("header".to_string(), Item::Str(self.header.clone())));
                }
                if spec.desc {
                    pairs.push(("desc".to_string(), Item::Str(desc)));
                }
                if spec.sequence {
                    pairs.push((
                        "sequence".to_string(),
                        Item::Str(self.sequence_lines.concat()),
                    ));
                }
                Item::Map(pairs)
            }
        }
    }
}

/// Parse `>`-delimited entries. Content whose first non-blank line is not a
/// header marker is malformed.
pub(crate) fn parse(content: &str, options: &SplitFastaOptions) -> Parsed {
    let mut records = Vec::new();
    let mut current: Option<Entry> = None;

    for line in content.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() && current.is_none() {
            continue;
        }
        if let Some(header) = trimmed.strip_prefix('>') {
            if let Some(entry) = current.take() {
                records.push(entry.into_item(options));
            }
            current = Some(Entry {
                header: header.to_string(),
                sequence_lines: Vec::new(),
            });
        } else {
            match current.as_mut() {
                Some(entry) => {
                    if !trimmed.is_empty() {
                        entry.sequence_lines.push(trimmed.to_string());
                    }
                }
                None => {
                    return Parsed::truncated(
                        records,
                        format!("expected `>` header marker, got: {trimmed}"),
                    );
                }
            }
        }
    }

    if let Some(entry) = current.take() {
        records.push(entry.into_item(options));
    }
    Parsed::complete(records)
}
