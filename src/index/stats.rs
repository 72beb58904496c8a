use crate::index::corpus::SearchIndex;
use anyhow::Result;
use std::path::Path;

/// Size figures for a built index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub documents: usize,
    pub distinct_words: usize,
    pub nodes: usize,
    /// Total `(word, document, position)` entries
    pub postings: usize,
    /// Longest document, in words
    pub longest_document: u32,
}

impl IndexStats {
    pub fn collect(index: &SearchIndex) -> Self {
        let words = index.trie().words();
        let postings = words
            .iter()
            .flat_map(|(_, postings)| postings.values())
            .map(|positions| positions.len())
            .sum();

        Self {
            documents: index.document_count(),
            distinct_words: words.len(),
            nodes: index.trie().node_count(),
            postings,
            longest_document: index
                .documents()
                .iter()
                .map(|d| d.word_count)
                .max()
                .unwrap_or(0),
        }
    }
}

/// Display index statistics
pub fn show_stats(index: &SearchIndex, session_path: Option<&Path>) -> Result<()> {
    let stats = IndexStats::collect(index);

    println!("Index Statistics");
    println!("================");
    println!();
    if let Some(path) = session_path {
        println!("Session file:     {}", path.display());
        if let Ok(meta) = std::fs::metadata(path) {
            println!("Session size:     {}", format_size(meta.len()));
        }
    }
    println!("Document count:   {}", stats.documents);
    println!("Distinct words:   {}", stats.distinct_words);
    println!("Trie nodes:       {}", stats.nodes);
    println!("Postings:         {}", stats.postings);
    println!("Longest document: {} words", stats.longest_document);

    println!();
    println!("Settings:");
    for line in index.config().describe().lines() {
        println!("  {}", line);
    }

    let mut largest: Vec<_> = index.documents().iter().collect();
    largest.sort_by(|a, b| b.word_count.cmp(&a.word_count).then(a.doc_id.cmp(&b.doc_id)));

    if !largest.is_empty() {
        println!();
        println!("Largest documents:");
        for doc in largest.iter().take(15) {
            println!("  {:30} {}", doc.name, doc.word_count);
        }
        if largest.len() > 15 {
            println!("  ... and {} more", largest.len() - 15);
        }
    }

    Ok(())
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
