//! Embedding-based community namer.
//!
//! Member short names are split into tokens, the centroid of their word
//! vectors is computed and the tokens closest to it (cosine) become the name.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::tokens::{is_stop_word, split_identifier, title_case, MIN_TOKEN_LEN};
use super::vectors::{EmbeddingError, WordVectors};
use super::{DisplayNamer, FALLBACK_NAME};
use crate::graph::node_id::NodeId;

/// Clusters below this size try the namespace heuristic first.
const SMALL_CLUSTER: usize = 4;

#[derive(Debug, Clone, PartialEq)]
struct WordScore {
    word: String,
    score: f32,
}

/// Names communities from a word-vector dictionary.
#[derive(Debug, Clone)]
pub struct EmbeddingNamer {
    vectors: WordVectors,
}

impl EmbeddingNamer {
    pub fn new(vectors: WordVectors) -> Self {
        Self { vectors }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EmbeddingError> {
        WordVectors::from_file(path).map(Self::new)
    }

    fn tokenize(&self, members: &[NodeId]) -> Vec<String> {
        let mut out = Vec::with_capacity(members.len() * 2);
        for member in members {
            for token in split_identifier(member.short_name()) {
                let token = token.to_lowercase();
                if token.len() >= MIN_TOKEN_LEN
                    && !is_stop_word(&token)
                    && self.vectors.contains(&token)
                {
                    out.push(token);
                }
            }
        }
        out
    }

    fn centroid(&self, tokens: &[String]) -> Option<Vec<f32>> {
        let mut centroid = vec![0.0f32; self.vectors.dim()];
        let mut count = 0usize;
        for vec in tokens.iter().filter_map(|t| self.vectors.get(t)) {
            for (c, v) in centroid.iter_mut().zip(vec) {
                *c += v;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let inv = 1.0 / count as f32;
        centroid.iter_mut().for_each(|c| *c *= inv);
        Some(centroid)
    }

    /// Distinct tokens ranked by cosine similarity to the centroid (ties by word).
    fn score(&self, tokens: &[String], centroid: &[f32]) -> Vec<WordScore> {
        let centroid_norm = l2_norm(centroid);
        if centroid_norm == 0.0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut scores: Vec<WordScore> = tokens
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .filter_map(|t| {
                self.vectors.get(t).map(|vec| WordScore {
                    word: t.clone(),
                    score: cosine(centroid, centroid_norm, vec),
                })
            })
            .collect();

        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.word.cmp(&b.word))
        });
        scores
    }
}

impl DisplayNamer for EmbeddingNamer {
    fn name(&self, members: &[NodeId]) -> String {
        if members.is_empty() {
            return FALLBACK_NAME.to_string();
        }
        if members.len() < SMALL_CLUSTER {
            if let Some(name) = fallback_from_namespaces(members) {
                return name;
            }
        }

        let tokens = self.tokenize(members);
        let Some(centroid) = self.centroid(&tokens) else {
            return fallback_from_namespaces(members).unwrap_or_else(|| FALLBACK_NAME.to_string());
        };
        let scores = self.score(&tokens, &centroid);
        if scores.is_empty() {
            return FALLBACK_NAME.to_string();
        }

        let mut words: Vec<String> = scores
            .iter()
            .take(decide_word_count(&scores))
            .map(|s| title_case(&s.word))
            .collect();
        words.sort();
        words.join(" ")
    }
}

/// One word for a clear winner, three for a flat spread, otherwise two.
fn decide_word_count(scores: &[WordScore]) -> usize {
    if scores.len() < 2 {
        return 1;
    }
    let top = &scores[..scores.len().min(5)];
    let mean = top.iter().map(|s| s.score).sum::<f32>() / top.len() as f32;
    let variance = top
        .iter()
        .map(|s| (s.score - mean).powi(2))
        .sum::<f32>()
        / top.len() as f32;
    let gap = scores[0].score - scores[1].score;

    if gap > 0.25 && variance < 0.02 {
        1
    } else if variance > 0.06 && gap < 0.10 {
        3
    } else {
        2
    }
}

/// Most common parent segment shared by more than one member.
fn fallback_from_namespaces(members: &[NodeId]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in members {
        let segments = member.segments();
        if segments.len() > 2 {
            *counts.entry(segments[segments.len() - 2]).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (segment, count) in counts {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((segment, count)),
        }
    }
    best.filter(|&(_, count)| count > 1)
        .map(|(segment, _)| title_case(segment))
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], norm_a: f32, b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
