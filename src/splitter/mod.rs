//! Structured splitters: decompose one upstream item (inline string content
//! or a file path) into a sub-sequence of records re-injected downstream.
//!
//! Malformed content is an operator-local failure, not a pipeline fault:
//! records already emitted for the item stand, splitting of that item stops
//! with a warning, and the stream continues with the next upstream item.

pub mod csv;
pub mod fasta;
pub mod fastq;
pub mod json;
pub mod text;

pub use csv::SplitCsvOptions;
pub use fasta::{FastaRecordSpec, SplitFastaOptions};
pub use fastq::SplitFastqOptions;

use crate::channel::Channel;
use crate::error::StreamError;
use crate::model::Item;
use crate::operator::{forward_fault, spawn_operator};

/// Parse result: the records recovered before any grammar error, plus the
/// error itself when parsing could not continue.
pub(crate) struct Parsed {
    pub records: Vec<Item>,
    pub error: Option<String>,
}

impl Parsed {
    pub(crate) fn complete(records: Vec<Item>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub(crate) fn truncated(records: Vec<Item>, error: impl Into<String>) -> Self {
        Self {
            records,
            error: Some(error.into()),
        }
    }
}

/// Resolve an upstream item into splittable text.
async fn load_content(item: &Item) -> Result<String, String> {
    match item {
        Item::Str(content) => Ok(content.clone()),
        Item::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|err| format!("failed to read {}: {err}", path.display())),
        other => Err(format!(
            "splitter expects string or path content, got {}",
            other.kind()
        )),
    }
}

/// Shared splitter loop: load each upstream item, run the parser, emit its
/// records, and warn-and-continue on malformed or unreadable content.
fn spawn_splitter<P>(name: &'static str, upstream: Channel, parse: P) -> Channel
where
    P: Fn(&str) -> Parsed + Send + 'static,
{
    spawn_operator(name, move |out| async move {
        let mut upstream = upstream;
        let mut index: u64 = 0;
        while let Some(message) = upstream.recv().await {
            match message {
                Ok(item) => {
                    match load_content(&item).await {
                        Ok(content) => {
                            let parsed = parse(&content);
                            for record in parsed.records {
                                if out.emit(record).await.is_err() {
                                    return Ok(());
                                }
                            }
                            if let Some(error) = parsed.error {
                                tracing::warn!(
                                    operator = name,
                                    index,
                                    %error,
                                    "malformed content, splitting stopped for this item"
                                );
                            }
                        }
                        Err(error) => {
                            tracing::warn!(operator = name, index, %error, "unreadable item skipped");
                        }
                    }
                    index += 1;
                }
                Err(error) => {
                    forward_fault(&out, error).await;
                    return Ok(());
                }
            }
        }
        Ok(())
    })
}

impl Channel {
    /// Split content into chunks of `by` consecutive lines (1 line per record
    /// by default usage).
    pub fn split_text(self, by: usize) -> Channel {
        if by == 0 {
            return spawn_operator("split_text", |_| async {
                Err(StreamError::new("split_text", "chunk size must be positive"))
            });
        }
        spawn_splitter("split_text", self, move |content| text::parse(content, by))
    }

    /// Parse delimited rows into records: `Map` rows under a header, plain
    /// cell `List`s without one. `skip` drops leading lines before header
    /// detection.
    pub fn split_csv(self, options: SplitCsvOptions) -> Channel {
        spawn_splitter("split_csv", self, move |content| {
            csv::parse(content, &options)
        })
    }

    /// Parse `>`-delimited sequence entries: raw text chunks, or `Map`
    /// records restricted to the requested fields.
    pub fn split_fasta(self, options: SplitFastaOptions) -> Channel {
        spawn_splitter("split_fasta", self, move |content| {
            fasta::parse(content, &options)
        })
    }

    /// Parse 4-line FASTQ records: raw chunks, or `Map` records with named
    /// header/sequence/quality fields.
    pub fn split_fastq(self, options: SplitFastqOptions) -> Channel {
        spawn_splitter("split_fastq", self, move |content| {
            fastq::parse(content, &options)
        })
    }

    /// Decompose a JSON document: a root array emits each element, a root
    /// object emits one `{key, value}` record per entry.
    pub fn split_json(self) -> Channel {
        spawn_splitter("split_json", self, json::parse)
    }
}
