//! Plain-text line splitting.

use crate::model::Item;
use crate::splitter::Parsed;

/// Split content into records of `by` consecutive lines each. The final
/// record may hold fewer lines when the line count is not a multiple of `by`.
pub(crate) fn parse(content: &str, by: usize) -> Parsed {
    let lines: Vec<&str> = content.lines().collect();
    let records = lines
        .chunks(by)
        .map(|chunk| Item::Str(chunk.join("\n")))
        .collect();
    Parsed::complete(records)
}
