//! Versioned binary session format.
//!
//! ```text
//! magic        4 bytes  "SSIX"
//! version      u32 LE
//! config       varint length + JSON SearchConfig
//! documents    varint count, then per document: name (varint length + UTF-8), word count
//! nodes        varint count, then every node in pre-order:
//!                tag (0 root, 1 char, 2 end), [char as varint], varint child count,
//!                end nodes only: varint doc count, then per doc: doc id, delta list of positions
//! counters     varint units scored, varint count, one varint per document
//! ```
//!
//! All integers after the header are LEB128 varints. Loading checks the whole
//! structure and fails with a typed error rather than returning a partial index.

use crate::error::{Result, SearchError};
use crate::index::corpus::SearchIndex;
use crate::index::trie::{NodeId, ROOT, Symbol, Trie, TrieNode};
use crate::index::types::{DocId, Document, Postings, SearchConfig};
use crate::query::scorer::Scorer;
use crate::utils::{
    ByteReader, encode_delta_list, encode_str, encode_varint, read_u32_le, write_u32_le,
};
use std::io::{self, Read, Write};

pub const SESSION_MAGIC: &[u8; 4] = b"SSIX";
pub const SESSION_VERSION: u32 = 1;

const TAG_ROOT: u8 = 0;
const TAG_CHAR: u8 = 1;
const TAG_END: u8 = 2;

/// Serialize an index and its score counters
pub fn write_snapshot<W: Write>(writer: &mut W, index: &SearchIndex, scorer: &Scorer) -> Result<()> {
    let mut body = Vec::new();

    let config = serde_json::to_vec(index.config())?;
    encode_varint(config.len() as u32, &mut body);
    body.extend_from_slice(&config);

    encode_varint(index.document_count() as u32, &mut body);
    for doc in index.documents() {
        encode_str(&doc.name, &mut body);
        encode_varint(doc.word_count, &mut body);
    }

    let trie = index.trie();
    encode_varint(trie.node_count() as u32, &mut body);
    let mut stack = vec![ROOT];
    while let Some(id) = stack.pop() {
        let node = trie.node(id);
        encode_node(node, &mut body);
        let mut children: Vec<NodeId> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }

    encode_varint(scorer.units_scored(), &mut body);
    encode_varint(scorer.scores().len() as u32, &mut body);
    for &score in scorer.scores() {
        encode_varint(score, &mut body);
    }

    writer.write_all(SESSION_MAGIC)?;
    write_u32_le(writer, SESSION_VERSION)?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

fn encode_node(node: &TrieNode, body: &mut Vec<u8>) {
    match node.symbol() {
        Symbol::Root => body.push(TAG_ROOT),
        Symbol::Char(ch) => {
            body.push(TAG_CHAR);
            encode_varint(ch as u32, body);
        }
        Symbol::End => body.push(TAG_END),
    }
    encode_varint(node.children.len() as u32, body);
    if let Some(postings) = node.postings() {
        encode_varint(postings.len() as u32, body);
        for (&doc_id, positions) in postings {
            encode_varint(doc_id, body);
            encode_delta_list(positions, body);
        }
    }
}

/// Restore an index and its score counters
pub fn read_snapshot<R: Read>(reader: &mut R) -> Result<(SearchIndex, Scorer)> {
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(SearchError::NotASession),
        Err(e) => return Err(e.into()),
    }
    if &magic != SESSION_MAGIC {
        return Err(SearchError::NotASession);
    }

    let version = match read_u32_le(reader) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(corrupt("truncated header"));
        }
        Err(e) => return Err(e.into()),
    };
    if version != SESSION_VERSION {
        return Err(SearchError::UnsupportedVersion {
            expected: SESSION_VERSION,
            actual: version,
        });
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    decode_body(&body)
}

fn corrupt(what: impl Into<String>) -> SearchError {
    SearchError::CorruptSession(what.into())
}

fn truncated(section: &str) -> SearchError {
    corrupt(format!("truncated {}", section))
}

fn decode_body(body: &[u8]) -> Result<(SearchIndex, Scorer)> {
    let mut r = ByteReader::new(body);

    let config_len = r.read_varint().ok_or_else(|| truncated("configuration"))? as usize;
    let config_bytes = r
        .read_bytes(config_len)
        .ok_or_else(|| truncated("configuration"))?;
    let config: SearchConfig = serde_json::from_slice(config_bytes)
        .map_err(|e| corrupt(format!("configuration: {}", e)))?;
    config
        .validate()
        .map_err(|e| corrupt(format!("configuration: {}", e)))?;

    let documents = decode_documents(&mut r)?;
    let nodes = decode_nodes(&mut r, &config, &documents)?;
    let scorer = decode_counters(&mut r, documents.len())?;

    if !r.is_empty() {
        return Err(corrupt(format!(
            "{} trailing bytes after offset {}",
            r.remaining(),
            r.position()
        )));
    }

    let trie = Trie::from_nodes(nodes, config.end_indicator);
    let index = SearchIndex::from_parts(config, documents, trie)?;
    Ok((index, scorer))
}

fn decode_documents(r: &mut ByteReader<'_>) -> Result<Vec<Document>> {
    let count = r.read_varint().ok_or_else(|| truncated("document table"))? as usize;
    if count > r.remaining() {
        return Err(corrupt("document count exceeds session size"));
    }

    let mut documents = Vec::with_capacity(count);
    for doc_id in 0..count as DocId {
        let name = r.read_str().ok_or_else(|| truncated("document table"))?;
        let word_count = r.read_varint().ok_or_else(|| truncated("document table"))?;
        documents.push(Document {
            doc_id,
            name: name.to_string(),
            word_count,
        });
    }
    Ok(documents)
}

fn decode_nodes(
    r: &mut ByteReader<'_>,
    config: &SearchConfig,
    documents: &[Document],
) -> Result<Vec<TrieNode>> {
    let node_count = r.read_varint().ok_or_else(|| truncated("trie"))? as usize;
    // Every node takes at least two bytes
    if node_count == 0 || node_count > r.remaining() / 2 {
        return Err(corrupt(format!("implausible node count {}", node_count)));
    }

    let (root, root_children) = decode_node(r, config, documents)?;
    if root.symbol != Symbol::Root {
        return Err(corrupt("first node is not the root"));
    }

    let mut nodes = Vec::with_capacity(node_count);
    nodes.push(root);
    // (node, children still to read)
    let mut pending: Vec<(NodeId, u32)> = vec![(ROOT, root_children)];

    while let Some(top) = pending.last_mut() {
        if top.1 == 0 {
            pending.pop();
            continue;
        }
        top.1 -= 1;
        let parent = top.0;

        if nodes.len() >= node_count {
            return Err(corrupt("more nodes than declared"));
        }
        let (node, child_count) = decode_node(r, config, documents)?;
        let symbol = node.symbol;
        if symbol == Symbol::Root {
            return Err(corrupt("root tag below the root"));
        }

        let id = nodes.len() as NodeId;
        let siblings = &mut nodes[parent as usize].children;
        if siblings.last().is_some_and(|&(prev, _)| prev >= symbol) {
            return Err(corrupt("children out of order or duplicated"));
        }
        siblings.push((symbol, id));
        nodes.push(node);

        if child_count > 0 {
            pending.push((id, child_count));
        }
    }

    if nodes.len() != node_count {
        return Err(corrupt(format!(
            "declared {} nodes, found {}",
            node_count,
            nodes.len()
        )));
    }
    Ok(nodes)
}

fn decode_node(
    r: &mut ByteReader<'_>,
    config: &SearchConfig,
    documents: &[Document],
) -> Result<(TrieNode, u32)> {
    let tag = r.read_u8().ok_or_else(|| truncated("trie"))?;
    let symbol = match tag {
        TAG_ROOT => Symbol::Root,
        TAG_CHAR => {
            let code = r.read_varint().ok_or_else(|| truncated("trie"))?;
            let ch = char::from_u32(code)
                .ok_or_else(|| corrupt(format!("invalid character code {}", code)))?;
            if ch == config.end_indicator {
                return Err(corrupt("end indicator stored inside a word"));
            }
            Symbol::Char(ch)
        }
        TAG_END => Symbol::End,
        other => return Err(corrupt(format!("unknown node tag {}", other))),
    };

    let child_count = r.read_varint().ok_or_else(|| truncated("trie"))?;
    let mut node = TrieNode::new(symbol);

    if symbol == Symbol::End {
        if child_count != 0 {
            return Err(corrupt("end node with children"));
        }
        node.postings = Some(decode_postings(r, documents)?);
    } else if child_count == 0 && symbol != Symbol::Root {
        return Err(corrupt("word path without an end node"));
    }

    Ok((node, child_count))
}

fn decode_postings(r: &mut ByteReader<'_>, documents: &[Document]) -> Result<Postings> {
    let doc_count = r.read_varint().ok_or_else(|| truncated("postings"))?;
    if doc_count == 0 {
        return Err(corrupt("end node without postings"));
    }

    let mut postings = Postings::new();
    let mut prev_doc: Option<DocId> = None;
    for _ in 0..doc_count {
        let doc_id = r.read_varint().ok_or_else(|| truncated("postings"))?;
        if prev_doc.is_some_and(|prev| prev >= doc_id) {
            return Err(corrupt("posting documents out of order"));
        }
        let doc = documents
            .get(doc_id as usize)
            .ok_or_else(|| corrupt(format!("unknown document id {}", doc_id)))?;

        let positions = r.read_delta_list().ok_or_else(|| truncated("postings"))?;
        match positions.last() {
            None => return Err(corrupt("empty position list")),
            Some(&last) if last >= doc.word_count => {
                return Err(corrupt(format!(
                    "position {} beyond the {} words of {:?}",
                    last, doc.word_count, doc.name
                )));
            }
            Some(_) => {}
        }

        postings.insert(doc_id, positions);
        prev_doc = Some(doc_id);
    }
    Ok(postings)
}

fn decode_counters(r: &mut ByteReader<'_>, document_count: usize) -> Result<Scorer> {
    let units_scored = r.read_varint().ok_or_else(|| truncated("counters"))?;
    let count = r.read_varint().ok_or_else(|| truncated("counters"))? as usize;
    if count != document_count {
        return Err(corrupt(format!(
            "{} counters for {} documents",
            count, document_count
        )));
    }

    let mut scores = Vec::with_capacity(count);
    for _ in 0..count {
        scores.push(r.read_varint().ok_or_else(|| truncated("counters"))?);
    }
    Ok(Scorer::from_counters(scores, units_scored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::trie::MAX_POSITION;
    use crate::index::types::Position;
    use crate::query::parser::Query;

    fn index() -> SearchIndex {
        let mut index = SearchIndex::new(SearchConfig::default()).unwrap();
        for (doc, text) in [("a.txt", "the cat sat on the catalog"), ("b.txt", "the dog sat")] {
            for (pos, word) in text.split_whitespace().enumerate() {
                index.insert(word, doc, pos as Position).unwrap();
            }
        }
        index
    }

    fn encode(index: &SearchIndex, scorer: &Scorer) -> Vec<u8> {
        let mut buf = Vec::new();
        write_snapshot(&mut buf, index, scorer).unwrap();
        buf
    }

    #[test]
    fn test_restore_is_identical() {
        let index = index();
        let mut scorer = Scorer::new(index.document_count());
        scorer.score(&index, &Query::from_words(["cat"]));

        let bytes = encode(&index, &scorer);
        let (restored, restored_scorer) = read_snapshot(&mut bytes.as_slice()).unwrap();

        assert_eq!(restored.config(), index.config());
        assert_eq!(restored.documents(), index.documents());
        assert_eq!(restored.trie().node_count(), index.trie().node_count());
        let mut before = index.trie().words();
        let mut after = restored.trie().words();
        before.sort();
        after.sort();
        assert_eq!(after, before);
        assert_eq!(restored_scorer, scorer);
        assert_eq!(restored.lookup("the"), index.lookup("the"));
    }

    #[test]
    fn test_highest_position_restores() {
        let mut index = SearchIndex::new(SearchConfig::default()).unwrap();
        index.insert("w", "a.txt", 0).unwrap();
        index.insert("w", "a.txt", MAX_POSITION).unwrap();
        assert!(index.insert("w", "a.txt", Position::MAX).is_err());
        assert_eq!(index.document(0).unwrap().word_count, Position::MAX);

        let bytes = encode(&index, &Scorer::new(1));
        let (restored, _) = read_snapshot(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored.documents(), index.documents());
        assert_eq!(restored.lookup("w").get(&0), Some(&vec![0, MAX_POSITION]));
    }

    #[test]
    fn test_empty_index_restores() {
        let index = SearchIndex::new(SearchConfig::default()).unwrap();
        let bytes = encode(&index, &Scorer::new(0));
        let (restored, _) = read_snapshot(&mut bytes.as_slice()).unwrap();
        assert!(restored.trie().is_empty());
        assert_eq!(restored.document_count(), 0);
    }

    #[test]
    fn test_rejects_foreign_bytes() {
        let err = read_snapshot(&mut &b"hello world"[..]).unwrap_err();
        assert!(matches!(err, SearchError::NotASession));

        let err = read_snapshot(&mut &b"SS"[..]).unwrap_err();
        assert!(matches!(err, SearchError::NotASession));
    }

    #[test]
    fn test_rejects_other_versions() {
        let mut bytes = encode(&index(), &Scorer::new(2));
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        let err = read_snapshot(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            SearchError::UnsupportedVersion {
                expected: 1,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_rejects_every_truncation() {
        let bytes = encode(&index(), &Scorer::new(2));
        for len in 0..bytes.len() {
            let err = read_snapshot(&mut &bytes[..len]).unwrap_err();
            assert!(err.is_invalid_session(), "length {} gave {:?}", len, err);
        }
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = encode(&index(), &Scorer::new(2));
        bytes.push(0);
        let err = read_snapshot(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SearchError::CorruptSession(_)));
    }

    #[test]
    fn test_rejects_counter_mismatch() {
        let index = index();
        let bytes = encode(&index, &Scorer::new(5));
        let err = read_snapshot(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SearchError::CorruptSession(_)));
    }
}
