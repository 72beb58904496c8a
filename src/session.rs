//! A built index together with its score counters, savable as one file.

use crate::error::Result;
use crate::index::corpus::SearchIndex;
use crate::index::snapshot::{read_snapshot, write_snapshot};
use crate::query::parser::{Query, parse_query};
use crate::query::scorer::{Report, Scorer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SearchSession {
    index: SearchIndex,
    scorer: Scorer,
}

impl SearchSession {
    pub fn new(index: SearchIndex) -> Self {
        let scorer = Scorer::new(index.document_count());
        Self { index, scorer }
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Parse `input` with the index's settings and run it
    pub fn search_str(&mut self, input: &str) -> Report {
        let query = parse_query(input, self.index.config());
        self.search(&query)
    }

    /// Reset the counters, score `query`, and rank the documents
    pub fn search(&mut self, query: &Query) -> Report {
        self.scorer.reset();
        self.scorer.score(&self.index, query);
        let report = self
            .scorer
            .rank(&self.index, self.index.config().maximum_report);
        debug!(
            units = query.len(),
            reported = report.entries().len(),
            "query ranked"
        );
        report
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_snapshot(writer, &self.index, &self.scorer)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let (index, scorer) = read_snapshot(reader)?;
        Ok(Self { index, scorer })
    }

    /// Write the session to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), documents = self.index.document_count(), "session saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let session = Self::read_from(&mut reader)?;
        info!(path = %path.display(), documents = session.index.document_count(), "session loaded");
        Ok(session)
    }
}
