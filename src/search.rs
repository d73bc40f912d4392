//! Query planning and ranking: BM25 over section-weighted frequencies,
//! multiplied by a positional proximity boost.
//!
//! Scoring walks the posting lists of every query term, accumulates a
//! BM25 score per candidate document, then (for multi-term queries)
//! boosts documents whose query terms sit close together, with an extra
//! boost when the co-occurrence is inside the title window.

use ahash::AHashMap;

use crate::error::Result;
use crate::index::barrel::BarrelStore;
use crate::index::directory::BarrelDirectory;
use crate::index::lexicon::Lexicon;
use crate::index::metadata::CorpusMetadata;

/// Term-frequency saturation parameter.
pub const K1: f64 = 1.5;
/// Length-normalization weight.
pub const B: f64 = 0.8;
/// Section weight for title frequency.
pub const TITLE_WEIGHT: f64 = 1.1;
/// Section weight for abstract frequency.
pub const ABSTRACT_WEIGHT: f64 = 0.2;
/// Section weight for keywords frequency.
pub const KEYWORDS_WEIGHT: f64 = 0.25;
/// Global proximity multiplier.
pub const PROXIMITY_BOOST: f64 = 2.0;
/// Title-proximity multiplier.
pub const TITLE_PROXIMITY_BOOST: f64 = 3.0;
/// Base proximity window.
pub const SAFE_DISTANCE_BASE: u32 = 5;
/// Maximum proximity window.
pub const MAX_SAFE_DISTANCE: u32 = 20;
/// Position cutoff deemed "in title".
pub const TITLE_BOUNDARY: u32 = 100;

/// A ranked document.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub doc_id: String,
    pub score: f64,
}

/// Translate a query string into term-ids.
///
/// Splits on single spaces and drops tokens without a lexicon entry;
/// order and duplicates are preserved.
pub fn translate_query(lexicon: &Lexicon, query: &str) -> Vec<u64> {
    query
        .split(' ')
        .filter_map(|token| lexicon.lookup(token))
        .collect()
}

/// Length-scaled proximity window, clamped to [`MAX_SAFE_DISTANCE`].
fn safe_distance(doc_length: u32) -> u32 {
    (SAFE_DISTANCE_BASE + doc_length / 1000).min(MAX_SAFE_DISTANCE)
}

/// Proximity contribution for two position lists: 1 at distance 0,
/// linearly down to 0 at the safe distance. Both lists must be
/// non-empty.
fn proximity_score(positions1: &[u32], positions2: &[u32], safe: u32) -> f64 {
    let mut min_distance = u32::MAX;
    for &p1 in positions1 {
        for &p2 in positions2 {
            let distance = p1.abs_diff(p2);
            if distance < min_distance {
                min_distance = distance;
            }
        }
    }

    if min_distance <= safe {
        1.0 - min_distance as f64 / safe as f64
    } else {
        0.0
    }
}

/// Rank all candidate documents for a translated query.
///
/// `query_terms` is the term-id sequence in query order, duplicates
/// included. Callers must not invoke this on an empty corpus
/// (`doc_count == 0` or `avg_length == 0`).
pub fn rank(
    query_terms: &[u64],
    metadata: &CorpusMetadata,
    directory: &BarrelDirectory,
    barrels: &BarrelStore,
) -> Result<Vec<ScoredDocument>> {
    let mut scores: AHashMap<String, f64> = AHashMap::new();
    let mut term_positions: AHashMap<String, AHashMap<u64, Vec<u32>>> = AHashMap::new();
    let mut doc_lengths: AHashMap<String, u32> = AHashMap::new();

    // First pass: BM25 accumulation, once per unique term.
    let mut seen_terms: Vec<u64> = Vec::new();
    for &term_id in query_terms {
        if seen_terms.contains(&term_id) {
            continue;
        }
        seen_terms.push(term_id);

        let Some(shard_id) = directory.shard_of(term_id) else {
            continue;
        };
        let postings = barrels.load_postings(shard_id, term_id)?;
        if postings.is_empty() {
            continue;
        }

        let df = postings.len() as f64;
        let n = metadata.doc_count as f64;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

        for posting in postings {
            let f = posting.frequency[0] as f64 * TITLE_WEIGHT
                + posting.frequency[1] as f64 * ABSTRACT_WEIGHT
                + posting.frequency[2] as f64 * KEYWORDS_WEIGHT;

            let numerator = f * (K1 + 1.0);
            let denominator =
                f + K1 * (1.0 - B + B * posting.length as f64 / metadata.avg_length);

            *scores.entry(posting.doc_id.clone()).or_insert(0.0) += idf * (numerator / denominator);
            doc_lengths.insert(posting.doc_id.clone(), posting.length);
            term_positions
                .entry(posting.doc_id)
                .or_default()
                .insert(term_id, posting.positions);
        }
    }

    // Second pass: proximity boost over sequence-index pairs.
    // Duplicated query terms contribute once per pair they appear in.
    if query_terms.len() >= 2 {
        for (doc_id, score) in scores.iter_mut() {
            let positions = &term_positions[doc_id];
            let safe = safe_distance(doc_lengths[doc_id]);
            let mut boost = 0.0;

            for i in 0..query_terms.len() - 1 {
                for j in i + 1..query_terms.len() {
                    let (Some(pos1), Some(pos2)) = (
                        positions.get(&query_terms[i]),
                        positions.get(&query_terms[j]),
                    ) else {
                        continue;
                    };

                    boost += PROXIMITY_BOOST * proximity_score(pos1, pos2, safe);

                    let title1: Vec<u32> =
                        pos1.iter().copied().filter(|&p| p < TITLE_BOUNDARY).collect();
                    let title2: Vec<u32> =
                        pos2.iter().copied().filter(|&p| p < TITLE_BOUNDARY).collect();
                    if !title1.is_empty() && !title2.is_empty() {
                        boost +=
                            TITLE_PROXIMITY_BOOST * proximity_score(&title1, &title2, safe);
                    }
                }
            }

            *score *= 1.0 + boost;
        }
    }

    let mut ranked: Vec<ScoredDocument> = scores
        .into_iter()
        .map(|(doc_id, score)| ScoredDocument { doc_id, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(ranked)
}
