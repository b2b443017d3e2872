//! W2V1 word-vector dictionary.
//!
//! Binary layout, all integers little-endian:
//!
//! ```text
//! "W2V1" | dim: u32 | count: u32 | count × (len: u16 | word: len bytes | dim × f32)
//! ```

use std::collections::HashMap;
use std::path::Path;

const MAGIC: &[u8; 4] = b"W2V1";

/// Only the first few vectors are checked for a dimension mismatch.
const VALIDATED_VECTORS: usize = 16;

/// Errors raised while loading a word-vector dictionary.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("failed to read word vectors: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid W2V1 magic header")]
    BadMagic,

    #[error("word-vector data truncated while reading {0}")]
    Truncated(&'static str),

    #[error("word #{index} is not valid UTF-8")]
    InvalidWord { index: usize },

    #[error("word-vector dimension must be > 0")]
    ZeroDimension,

    #[error("vector for {word:?} has {actual} values, expected {expected}")]
    DimensionMismatch {
        word: String,
        expected: usize,
        actual: usize,
    },

    #[error("word-vector dictionary is empty")]
    Empty,
}

/// Word → embedding lookup table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Build from in-memory vectors, validating the dictionary.
    pub fn new(dim: usize, vectors: HashMap<String, Vec<f32>>) -> Result<Self, EmbeddingError> {
        let wv = Self { dim, vectors };
        wv.validate()?;
        Ok(wv)
    }

    /// Load a W2V1 file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EmbeddingError> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Decode a W2V1 buffer.
    pub fn parse(data: &[u8]) -> Result<Self, EmbeddingError> {
        let mut reader = ByteReader { data, pos: 0 };

        if reader.take(MAGIC.len(), "magic header")? != MAGIC {
            return Err(EmbeddingError::BadMagic);
        }
        let dim = reader.u32("dimension")? as usize;
        let count = reader.u32("word count")? as usize;

        let mut vectors = HashMap::with_capacity(count);
        for index in 0..count {
            let len = reader.u16("word length")? as usize;
            let word = std::str::from_utf8(reader.take(len, "word")?)
                .map_err(|_| EmbeddingError::InvalidWord { index })?
                .to_string();
            let mut vec = Vec::with_capacity(dim);
            for _ in 0..dim {
                vec.push(reader.f32("vector")?);
            }
            vectors.insert(word, vec);
        }

        Self::new(dim, vectors)
    }

    fn validate(&self) -> Result<(), EmbeddingError> {
        if self.dim == 0 {
            return Err(EmbeddingError::ZeroDimension);
        }
        if self.vectors.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        for (word, vec) in self.vectors.iter().take(VALIDATED_VECTORS) {
            if vec.len() != self.dim {
                return Err(EmbeddingError::DimensionMismatch {
                    word: word.clone(),
                    expected: self.dim,
                    actual: vec.len(),
                });
            }
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], EmbeddingError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(EmbeddingError::Truncated(what))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], EmbeddingError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, what)?);
        Ok(buf)
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, EmbeddingError> {
        Ok(u16::from_le_bytes(self.array(what)?))
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, EmbeddingError> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    fn f32(&mut self, what: &'static str) -> Result<f32, EmbeddingError> {
        Ok(f32::from_le_bytes(self.array(what)?))
    }
}

/// Encode vectors in the W2V1 layout. Words are written in ascending order.
pub fn encode_w2v1(dim: usize, vectors: &[(&str, Vec<f32>)]) -> Vec<u8> {
    let mut sorted: Vec<&(&str, Vec<f32>)> = vectors.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(dim as u32).to_le_bytes());
    out.extend_from_slice(&(sorted.len() as u32).to_le_bytes());
    for (word, vec) in sorted {
        out.extend_from_slice(&(word.len() as u16).to_le_bytes());
        out.extend_from_slice(word.as_bytes());
        for value in vec {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}
