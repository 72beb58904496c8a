//! Scoring module for search results
//!
//! A document's score is the number of query units it matches; each unit
//! counts once per document however often it occurs. Reports express the
//! score as a percentage of the units scored since the last reset.

use crate::index::corpus::SearchIndex;
use crate::index::types::DocId;
use crate::query::parser::{Query, QueryUnit};

/// One line of a ranked report
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub doc_id: DocId,
    pub name: String,
    /// Number of query units the document matched
    pub matched_units: u32,
    /// `matched_units / total_units * 100`
    pub percentage: f64,
}

/// Outcome of ranking a query
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Documents by descending score, at most `maximum_report` of them
    Ranked(Vec<RankedDocument>),
    /// No document matched any unit
    NoMatches,
}

impl Report {
    pub fn is_no_matches(&self) -> bool {
        matches!(self, Report::NoMatches)
    }

    pub fn entries(&self) -> &[RankedDocument] {
        match self {
            Report::Ranked(entries) => entries,
            Report::NoMatches => &[],
        }
    }
}

/// Per-document match counters.
///
/// Counters accumulate across [`Scorer::score`] calls until
/// [`Scorer::reset`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scorer {
    scores: Vec<u32>,
    units_scored: u32,
}

impl Scorer {
    /// Scorer with one zeroed counter per document
    pub fn new(document_count: usize) -> Self {
        Self {
            scores: vec![0; document_count],
            units_scored: 0,
        }
    }

    /// Restore counters saved with a session
    pub(crate) fn from_counters(scores: Vec<u32>, units_scored: u32) -> Self {
        Self {
            scores,
            units_scored,
        }
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn units_scored(&self) -> u32 {
        self.units_scored
    }

    pub fn score_of(&self, doc_id: DocId) -> u32 {
        self.scores.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.scores.iter_mut().for_each(|s| *s = 0);
        self.units_scored = 0;
    }

    /// Add one point to every document matching each unit of `query`
    pub fn score(&mut self, index: &SearchIndex, query: &Query) {
        if self.scores.len() < index.document_count() {
            self.scores.resize(index.document_count(), 0);
        }
        for unit in &query.units {
            self.score_unit(index, unit);
        }
    }

    fn score_unit(&mut self, index: &SearchIndex, unit: &QueryUnit) {
        for doc_id in index.resolve(unit).into_keys() {
            if let Some(score) = self.scores.get_mut(doc_id as usize) {
                *score += 1;
            }
        }
        self.units_scored += 1;
    }

    /// Rank documents by descending score.
    ///
    /// Equal scores keep ascending document id order. Returns
    /// [`Report::NoMatches`] when every counter is zero.
    pub fn rank(&self, index: &SearchIndex, maximum_report: usize) -> Report {
        if self.units_scored == 0 || self.scores.iter().all(|&s| s == 0) {
            return Report::NoMatches;
        }

        let mut order: Vec<DocId> = (0..self.scores.len() as DocId).collect();
        // Stable sort keeps ascending id among ties
        order.sort_by(|a, b| self.score_of(*b).cmp(&self.score_of(*a)));

        let total = self.units_scored as f64;
        let entries = order
            .into_iter()
            .take(maximum_report)
            .filter_map(|doc_id| {
                let doc = index.document(doc_id)?;
                let matched_units = self.score_of(doc_id);
                Some(RankedDocument {
                    doc_id,
                    name: doc.name.clone(),
                    matched_units,
                    percentage: matched_units as f64 / total * 100.0,
                })
            })
            .collect();

        Report::Ranked(entries)
    }
}
