// ABOUTME: In-memory passage index over the leave-policy document.
// ABOUTME: Splits the document into paragraph-aligned chunks and ranks them by weighted term overlap.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Upper bound on characters per chunk, before a single oversized paragraph.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Number of passages returned per query.
pub const DEFAULT_TOP_K: usize = 4;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "i", "in", "is", "it", "me", "my", "of", "on", "or", "our", "the", "to", "what", "when",
    "which", "who", "will", "with", "you", "your",
];

/// Errors that can occur while building the index.
#[derive(Debug, Error)]
pub enum PolicyIndexError {
    #[error("failed to read policy document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    term_counts: HashMap<String, u32>,
}

/// A read-only index built once at startup.
///
/// Ranking is deterministic: the same query against the same index always
/// yields the same passages in the same order.
#[derive(Debug, Clone, Default)]
pub struct PolicyIndex {
    chunks: Vec<Chunk>,
    document_frequency: HashMap<String, u32>,
}

impl PolicyIndex {
    /// Read and index the document at `path`.
    pub fn from_path(path: &Path) -> Result<Self, PolicyIndexError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyIndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_text(&text, DEFAULT_CHUNK_SIZE);
        tracing::info!(
            path = %path.display(),
            chunks = index.len(),
            "policy index built"
        );
        Ok(index)
    }

    /// Index in-memory text with the given chunk size.
    pub fn from_text(text: &str, chunk_size: usize) -> Self {
        let chunks: Vec<Chunk> = split_into_chunks(text, chunk_size)
            .into_iter()
            .map(|text| {
                let mut term_counts = HashMap::new();
                for term in tokenize(&text) {
                    *term_counts.entry(term).or_insert(0) += 1;
                }
                Chunk { text, term_counts }
            })
            .collect();

        let mut document_frequency = HashMap::new();
        for chunk in &chunks {
            for term in chunk.term_counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        Self {
            chunks,
            document_frequency,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The `k` most relevant passages, best first. Ties keep document order.
    pub fn search(&self, query: &str, k: usize) -> Vec<&str> {
        let query_terms: HashSet<String> = tokenize(query).collect();
        let total = self.chunks.len() as f64;

        let mut scored: Vec<(usize, f64)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let score = query_terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *chunk.term_counts.get(term)? as f64;
                        let df = *self.document_frequency.get(term)? as f64;
                        Some(tf * (1.0 + total / df).ln())
                    })
                    .sum();
                (i, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| self.chunks[i].text.as_str())
            .collect()
    }

    /// Top passages joined by a blank line. Empty when the index is empty.
    pub fn passages(&self, query: &str, k: usize) -> String {
        self.search(query, k).join(PARAGRAPH_SEPARATOR)
    }
}

/// Group paragraphs into chunks of at most `chunk_size` characters. A single
/// paragraph longer than that becomes its own chunk.
fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let paragraph_len = paragraph.chars().count();
        if paragraph_len > chunk_size {
            tracing::warn!(
                length = paragraph_len,
                chunk_size,
                "policy paragraph exceeds chunk size; keeping it whole"
            );
        }

        if current.is_empty() {
            current.push_str(paragraph);
        } else if current.chars().count() + PARAGRAPH_SEPARATOR.len() + paragraph_len <= chunk_size {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(paragraph);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "Sick Leave\n\nEmployees receive 12 days of sick leave per year. \
        A medical certificate is required for sick leave longer than two days.\n\n\
        Casual Leave\n\nEmployees receive 10 days of casual leave per year.\n\n\
        Annual Leave\n\nAnnual leave may be carried forward up to 15 days.";

    #[test]
    fn small_chunks_follow_paragraphs() {
        let index = PolicyIndex::from_text(POLICY, 80);
        assert!(index.len() >= 3);
        for chunk in &index.chunks {
            assert!(!chunk.text.starts_with('\n'));
        }
    }

    #[test]
    fn whole_document_fits_in_one_default_chunk() {
        let index = PolicyIndex::from_text(POLICY, DEFAULT_CHUNK_SIZE);
        assert_eq!(index.len(), 1);
        assert!(index.passages("anything", DEFAULT_TOP_K).contains("carried forward"));
    }

    #[test]
    fn most_relevant_passage_ranks_first() {
        let index = PolicyIndex::from_text(POLICY, 80);
        let hits = index.search("carry forward annual leave", 2);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].contains("carried forward"), "got {:?}", hits);

        let hits = index.search("medical certificate for sick days", 1);
        assert!(hits[0].contains("medical certificate"));
    }

    #[test]
    fn identical_queries_return_identical_passages() {
        let index = PolicyIndex::from_text(POLICY, 80);
        let first = index.passages("What is the sick leave policy?", DEFAULT_TOP_K);
        let second = index.passages("What is the sick leave policy?", DEFAULT_TOP_K);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn empty_index_returns_empty_text() {
        let index = PolicyIndex::from_text("   \n\n  ", DEFAULT_CHUNK_SIZE);
        assert!(index.is_empty());
        assert_eq!(index.passages("sick leave", DEFAULT_TOP_K), "");
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let long = "leave ".repeat(50);
        let chunks = split_into_chunks(&long, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], long.trim());
    }

    #[test]
    fn missing_document_is_an_error() {
        let err = PolicyIndex::from_path(Path::new("/nonexistent/policy.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policy.txt"));
    }
}
