//! Posting model and per-document posting extraction.
//!
//! A posting records one (term, document) pair: the term's raw
//! frequency in each of the three sections, its token positions in a
//! single concatenated coordinate space (title first, then abstract,
//! then keywords), and the document's total token length. The length is
//! duplicated into every posting so the ranker never needs a second
//! lookup.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::data::PreprocessedDocument;
use crate::index::lexicon::Lexicon;

/// Number of indexed sections per document.
pub const SECTION_COUNT: usize = 3;

/// An indexed document section, in coordinate-space order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Title = 0,
    Abstract = 1,
    Keywords = 2,
}

/// One entry in a term's inverted list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: String,
    /// Raw term frequency per section: `[title, abstract, keywords]`.
    pub frequency: [u32; SECTION_COUNT],
    /// Ascending token positions in the concatenated coordinate space.
    pub positions: Vec<u32>,
    /// Total document length in tokens.
    pub length: u32,
}

/// Per-term occurrence data accumulated while scanning one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermOccurrences {
    pub frequency: [u32; SECTION_COUNT],
    pub positions: Vec<u32>,
}

/// Split a normalized section into tokens.
///
/// An empty section string carries no tokens (it must not contribute a
/// phantom empty token to the document length).
pub fn tokenize(section: &str) -> Vec<&str> {
    if section.is_empty() {
        Vec::new()
    } else {
        section.split(' ').collect()
    }
}

/// Extracted postings for a single document: one entry per distinct
/// term, keyed by term-id, plus the document's total token length.
#[derive(Debug)]
pub struct ExtractedPostings {
    pub terms: BTreeMap<u64, TermOccurrences>,
    pub length: u32,
}

/// Scan a preprocessed document and build its term occurrence map.
///
/// `Lexicon::resolve` is called exactly once per distinct term, so the
/// lexicon's frequency counter stays a per-document count. Positions
/// are recorded against the section's base offset in the concatenated
/// coordinate space (title at 0, abstract after the title, keywords
/// last).
pub fn extract_postings(lexicon: &mut Lexicon, doc: &PreprocessedDocument) -> ExtractedPostings {
    let sections = [
        (Section::Title, tokenize(&doc.title)),
        (Section::Abstract, tokenize(&doc.abstract_text)),
        (Section::Keywords, tokenize(&doc.keywords)),
    ];

    let mut terms: BTreeMap<u64, TermOccurrences> = BTreeMap::new();
    let mut resolved: AHashMap<&str, u64> = AHashMap::new();

    let mut base_offset: u32 = 0;
    for (section, tokens) in &sections {
        for (pos, token) in tokens.iter().enumerate() {
            let term_id = *resolved
                .entry(*token)
                .or_insert_with(|| lexicon.resolve(token));

            let occ = terms.entry(term_id).or_default();
            occ.positions.push(base_offset + pos as u32);
            occ.frequency[*section as usize] += 1;
        }
        base_offset += tokens.len() as u32;
    }

    ExtractedPostings {
        terms,
        length: base_offset,
    }
}
