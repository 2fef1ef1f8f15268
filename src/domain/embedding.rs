// ============================================================
// Layer 1 - PretrainedEmbeddings
// ============================================================
// In-memory implementation of EmbeddingSource. Vectors are
// kept in one flat buffer; `index` maps a token to its row.
//
// Example:
//   let mut e = PretrainedEmbeddings::new(3, Some("unk"));
//   e.insert("exploit", vec![0.1, 0.2, 0.3])?;

use std::collections::HashMap;

use crate::domain::traits::EmbeddingSource;
use crate::errors::{Result, TaggerError};

#[derive(Debug, Clone)]
pub struct PretrainedEmbeddings {
    unk:     Option<String>,
    dim:     usize,
    tokens:  Vec<String>,
    index:   HashMap<String, usize>,
    vectors: Vec<f32>,
}

impl PretrainedEmbeddings {
    /// Create an empty table of `dim`-sized vectors.
    pub fn new(dim: usize, unk: Option<impl Into<String>>) -> Self {
        Self {
            unk:     unk.map(Into::into),
            dim,
            tokens:  Vec::new(),
            index:   HashMap::new(),
            vectors: Vec::new(),
        }
    }

    /// Build a table from `(token, vector)` pairs.
    pub fn from_pairs<I, S>(dim: usize, unk: Option<&str>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut table = Self::new(dim, unk);
        for (token, vector) in pairs {
            table.insert(token, vector)?;
        }
        Ok(table)
    }

    /// Add or replace the vector for `token`.
    ///
    /// Fails if the vector length differs from `dim`.
    pub fn insert(&mut self, token: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        let token = token.into();
        if vector.len() != self.dim {
            return Err(TaggerError::EmbeddingDim {
                token,
                expected: self.dim,
                found: vector.len(),
            });
        }

        match self.index.get(&token) {
            Some(&row) => {
                let start = row * self.dim;
                self.vectors[start..start + self.dim].copy_from_slice(&vector);
            }
            None => {
                self.index.insert(token.clone(), self.tokens.len());
                self.tokens.push(token);
                self.vectors.extend_from_slice(&vector);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl EmbeddingSource for PretrainedEmbeddings {
    fn unk(&self) -> Option<&str> {
        self.unk.as_deref()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    fn vector(&self, token: &str) -> Option<&[f32]> {
        self.index.get(token).map(|&row| {
            let start = row * self.dim;
            &self.vectors[start..start + self.dim]
        })
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }
}
