//! Local knowledge base lookup for the diet agent.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config_manager::utils::load_text_file_with_guess_encoding;

/// Returns supporting reference text for a query.
///
/// Lookups are synchronous and side-effect free; an empty string means
/// nothing relevant was found.
pub trait KnowledgeRetriever: Send + Sync {
    fn retrieve(&self, query: &str) -> String;
}

/// Retriever that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKnowledge;

impl KnowledgeRetriever for NoKnowledge {
    fn retrieve(&self, _query: &str) -> String {
        String::new()
    }
}

#[derive(Debug, Clone)]
struct Snippet {
    text: String,
    words: HashSet<String>,
}

/// Keyword-overlap retriever over a directory of `.txt` and `.md` files.
///
/// Each file is split into blank-line separated snippets. A query scores a
/// snippet by the number of distinct words they share.
#[derive(Debug, Default)]
pub struct DirectoryRetriever {
    snippets: Vec<Snippet>,
    top_k: usize,
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]{3,}").expect("word pattern is valid"))
}

fn words(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

impl DirectoryRetriever {
    /// Load every snippet under `dir`. A missing directory yields an empty
    /// retriever rather than an error. Files that are not UTF-8 are decoded
    /// as GBK; files that cannot be read are skipped.
    pub fn load(dir: impl AsRef<Path>, top_k: usize) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut retriever = Self {
            snippets: Vec::new(),
            top_k,
        };

        if !dir.exists() {
            warn!("Knowledge directory {:?} not found, retrieval disabled", dir);
            return Ok(retriever);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("txt") | Some("md")
                    )
            })
            .collect();
        paths.sort();

        for path in paths {
            match load_text_file_with_guess_encoding(&path.to_string_lossy()) {
                Ok(content) => retriever.add_document(&content),
                Err(e) => warn!("Skipping unreadable knowledge file {:?}: {}", path, e),
            }
        }

        info!(
            "Loaded {} knowledge snippets from {:?}",
            retriever.snippets.len(),
            dir
        );
        Ok(retriever)
    }

    /// Build a retriever from in-memory documents
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a str>, top_k: usize) -> Self {
        let mut retriever = Self {
            snippets: Vec::new(),
            top_k,
        };
        for doc in documents {
            retriever.add_document(doc);
        }
        retriever
    }

    fn add_document(&mut self, content: &str) {
        let normalized = content.replace("\r\n", "\n");
        for chunk in normalized.split("\n\n") {
            let text = chunk.trim();
            if text.is_empty() {
                continue;
            }
            self.snippets.push(Snippet {
                text: text.to_string(),
                words: words(text),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

impl KnowledgeRetriever for DirectoryRetriever {
    fn retrieve(&self, query: &str) -> String {
        let query_words = words(query);
        if query_words.is_empty() || self.top_k == 0 {
            return String::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .snippets
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.words.intersection(&query_words).count(), idx))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Highest score first; ties keep document order.
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let hits: Vec<&str> = scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, idx)| self.snippets[idx].text.as_str())
            .collect();
        debug!("Knowledge lookup matched {} snippets", hits.len());
        hits.join("\n\n")
    }
}
