use crate::index::corpus::SearchIndex;
use crate::index::types::SearchConfig;
use crate::utils::progress::{document_bar, spinner};
use crate::utils::{Token, tokenize};
use anyhow::{Context, Result, bail};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// A document read from disk and split into words (computed in parallel)
pub struct TokenizedDocument {
    pub name: String,
    pub tokens: Vec<Token>,
}

/// Outcome of comparing an index against its source directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub documents_checked: usize,
    /// Documents whose reconstructed word sequence differs from the file
    pub mismatched: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.mismatched.is_empty()
    }
}

fn extension_matcher(config: &SearchConfig) -> Result<GlobMatcher> {
    let pattern = format!("*.{}", config.file_extension);
    let glob = Glob::new(&pattern).with_context(|| format!("Invalid file extension {:?}", config.file_extension))?;
    Ok(glob.compile_matcher())
}

/// Files directly inside `root` with the configured extension, sorted by name
pub fn discover_documents(root: &Path, config: &SearchConfig) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Directory not found: {}", root.display()))?;
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let matcher = extension_matcher(config)?;
    let walker = WalkBuilder::new(&root)
        .max_depth(Some(1))
        .standard_filters(false)
        .follow_links(true)
        .build();

    let mut paths: Vec<PathBuf> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.depth() == 1)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    Ok(paths)
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and tokenize `paths` on `threads` workers, keeping their order.
/// Unreadable files are skipped and counted.
pub fn read_documents(
    paths: &[PathBuf],
    config: &SearchConfig,
    threads: usize,
    silent: bool,
) -> Result<(Vec<TokenizedDocument>, usize)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to start reader threads")?;

    let progress_bar = document_bar(paths.len() as u64, silent);
    let error_count = Arc::new(AtomicUsize::new(0));

    let documents: Vec<TokenizedDocument> = pool.install(|| {
        paths
            .par_iter()
            .filter_map(|path| {
                let result = match fs::read_to_string(path) {
                    Ok(text) => Some(TokenizedDocument {
                        name: document_name(path),
                        tokens: tokenize(&text, config),
                    }),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable file");
                        error_count.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                };
                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!("Read {} documents", documents.len()));
    }

    Ok((documents, error_count.load(Ordering::Relaxed)))
}

/// Build the index for every matching file in `root`
pub fn build_index(root: &Path, config: SearchConfig, silent: bool) -> Result<SearchIndex> {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    build_index_with_threads(root, config, threads, silent)
}

/// Build the index, reading files on `threads` workers.
///
/// Files are read in parallel but inserted by a single writer in file name
/// order, so document ids and postings do not depend on scheduling.
pub fn build_index_with_threads(
    root: &Path,
    config: SearchConfig,
    threads: usize,
    silent: bool,
) -> Result<SearchIndex> {
    let collect_spinner = spinner("Discovering files...", silent);
    let paths = discover_documents(root, &config)?;
    if let Some(spinner) = collect_spinner {
        spinner.finish_with_message(format!("Found {} files", paths.len()));
    }

    let (documents, errors) = read_documents(&paths, &config, threads, silent)?;

    let mut index = SearchIndex::new(config)?;
    let mut total_words = 0usize;
    for doc in &documents {
        let doc_id = index.add_document(&doc.name);
        index
            .insert_tokens(doc_id, &doc.tokens)
            .with_context(|| format!("Cannot index {}", doc.name))?;
        total_words += doc.tokens.len();
        debug!(document = %doc.name, doc_id, words = doc.tokens.len(), "indexed document");
    }

    info!(
        root = %root.display(),
        documents = index.document_count(),
        words = total_words,
        distinct_words = index.trie().word_count(),
        nodes = index.trie().node_count(),
        "index built"
    );
    if errors > 0 && !silent {
        eprintln!("({} files could not be read)", errors);
    }

    Ok(index)
}

/// Compare every document rebuilt from the trie with a fresh tokenization of its file
pub fn verify_round_trip(root: &Path, index: &SearchIndex, threads: usize) -> Result<VerifyReport> {
    let paths = discover_documents(root, index.config())?;
    let (documents, _) = read_documents(&paths, index.config(), threads, true)?;
    let rebuilt = index.reconstruct_documents();

    let mut report = VerifyReport::default();
    for doc in &documents {
        report.documents_checked += 1;
        let expected: Vec<&str> = doc.tokens.iter().map(|t| t.word.as_str()).collect();
        let matches = index
            .doc_id(&doc.name)
            .and_then(|id| rebuilt.get(id as usize))
            .is_some_and(|words| words.iter().map(String::as_str).eq(expected.iter().copied()));
        if !matches {
            report.mismatched.push(doc.name.clone());
        }
    }

    if report.documents_checked != index.document_count() {
        let on_disk: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        for doc in index.documents() {
            if !on_disk.contains(&doc.name.as_str()) {
                report.mismatched.push(doc.name.clone());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    fn corpus(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        dir
    }

    #[test]
    fn test_discovers_only_matching_files() {
        let dir = corpus(&[("b.txt", "x"), ("a.txt", "y"), ("notes.md", "z")]);
        fs::create_dir(dir.path().join("sub.txt")).unwrap();
        fs::write(dir.path().join("sub.txt").join("c.txt"), "w").unwrap();

        let paths = discover_documents(dir.path(), &SearchConfig::default()).unwrap();
        let names: Vec<String> = paths.iter().map(|p| document_name(p)).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_followed() {
        let target = corpus(&[("real.txt", "linked words")]);
        let dir = corpus(&[("a.txt", "plain words")]);
        std::os::unix::fs::symlink(target.path().join("real.txt"), dir.path().join("b.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("absent.txt"), dir.path().join("c.txt")).unwrap();

        let index = build_index(dir.path(), SearchConfig::default(), true).unwrap();
        assert_eq!(index.document_count(), 2);
        assert_eq!(index.lookup("linked").keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(build_index(&missing, SearchConfig::default(), true).is_err());
    }

    #[test]
    fn test_build_assigns_ids_by_name() {
        let dir = corpus(&[("b.txt", "the dog sat"), ("a.txt", "The cat, sat.")]);
        let index = build_index_with_threads(dir.path(), SearchConfig::default(), 2, true).unwrap();

        assert_eq!(index.doc_id("a.txt"), Some(0));
        assert_eq!(index.doc_id("b.txt"), Some(1));
        assert_eq!(index.lookup("cat").get(&0), Some(&vec![1]));
        assert_eq!(index.lookup("sat").len(), 2);
    }

    #[test]
    fn test_sentinel_collision_aborts_build() {
        let dir = corpus(&[("a.txt", "costs $5")]);
        let err = build_index(dir.path(), SearchConfig::default(), true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SearchError>(),
            Some(SearchError::SentinelCollision { .. })
        ));
        assert!(format!("{:#}", err).contains("a.txt"));
    }

    #[test]
    fn test_verify_round_trip() {
        let dir = corpus(&[("a.txt", "one two\nthree one"), ("b.txt", "")]);
        let index = build_index(dir.path(), SearchConfig::default(), true).unwrap();
        let report = verify_round_trip(dir.path(), &index, 1).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.documents_checked, 2);

        fs::write(dir.path().join("a.txt"), "one two three").unwrap();
        let report = verify_round_trip(dir.path(), &index, 1).unwrap();
        assert_eq!(report.mismatched, vec!["a.txt"]);
    }
}
