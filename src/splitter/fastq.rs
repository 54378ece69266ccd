//! FASTQ record splitting: fixed 4-line blocks of header, sequence,
//! separator, quality.

use crate::model::Item;
use crate::splitter::Parsed;

/// Options for [`crate::channel::Channel::split_fastq`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitFastqOptions {
    /// Emit `Map` records with `header`/`sequence`/`quality` fields instead
    /// of raw 4-line chunks.
    pub record: bool,
}

impl SplitFastqOptions {
    /// Raw 4-line chunks.
    pub fn text() -> Self {
        Self { record: false }
    }

    /// Named-field `Map` records.
    pub fn record() -> Self {
        Self { record: true }
    }
}

/// Parse 4-line FASTQ blocks. A block with a missing `@` header, missing `+`
/// separator, or truncated at end of content is malformed; complete records
/// before the defect are kept.
pub(crate) fn parse(content: &str, options: &SplitFastqOptions) -> Parsed {
    let lines: Vec<&str> = content.lines().collect();
    let mut records = Vec::new();

    for (block_idx, block) in lines.chunks(4).enumerate() {
        if block.iter().all(|line| line.trim().is_empty()) {
            continue;
        }
        if block.len() < 4 {
            return Parsed::truncated(
                records,
                format!("truncated record at block {block_idx}: expected 4 lines, got {}", block.len()),
            );
        }
        let header = match block[0].strip_prefix('@') {
            Some(header) => header,
            None => {
                return Parsed::truncated(
                    records,
                    format!("record {block_idx} missing `@` header: {}", block[0]),
                );
            }
        };
        if !block[2].starts_with('+') {
            return Parsed::truncated(
                records,
                format!("record {block_idx} missing `+` separator: {}", block[2]),
            );
        }

        let record = if options.record {
            Item::Map(vec![
                ("header".to_string(), Item::Str(header.to_string())),
                ("sequence".to_string(), Item::Str(block[1].to_string())),
                ("quality".to_string(), Item::Str(block[3].to_string())),
            ])
        } else {
            Item::Str(block.join("\n"))
        };
        records.push(record);
    }

    Parsed::complete(records)
}
