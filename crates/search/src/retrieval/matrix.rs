//! Dense row-major embedding matrix and its binary encoding
//!
//! File layout (little-endian):
//! `b"RFIX"` | u32 version | u64 rows | u64 dim | rows * dim f32 values

use resumeforge_common::embeddings::{dot, normalize};
use resumeforge_common::errors::{AppError, Result};

const MAGIC: &[u8; 4] = b"RFIX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 8;

/// One unit-normalized vector per chunk, stored contiguously
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Assemble a matrix from per-row vectors. All rows must share one non-zero width.
    pub fn from_rows(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let rows = vectors.len();
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if rows > 0 && dim == 0 {
            return Err(AppError::EmbeddingError {
                message: "Embedder returned zero-length vectors".to_string(),
            });
        }

        let mut data = Vec::with_capacity(rows * dim);
        for vector in vectors {
            if vector.len() != dim {
                return Err(AppError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            data.extend(vector);
        }

        Ok(Self { rows, dim, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    /// Scale every row to unit length
    pub fn normalize_rows(&mut self) {
        if self.dim == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.dim) {
            normalize(row);
        }
    }

    /// Dot product of `query` against every row, in row order
    pub fn scores(&self, query: &[f32]) -> Vec<f32> {
        if self.dim == 0 {
            return Vec::new();
        }
        self.data.chunks_exact(self.dim).map(|row| dot(row, query)).collect()
    }

    /// Serialize to the on-disk layout
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + std::mem::size_of_val(self.data.as_slice()));
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.rows as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dim as u64).to_le_bytes());
        for &value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Parse the on-disk layout, rejecting truncated or malformed data
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(corrupt("vector file has an invalid header"));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(corrupt(&format!("unsupported vector file version {}", version)));
        }

        let rows = read_u64(&bytes[8..16]);
        let dim = read_u64(&bytes[16..24]);
        if rows > 0 && dim == 0 {
            return Err(corrupt("vector file has zero-width rows"));
        }

        let expected_len = rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>() as u64))
            .and_then(|n| n.checked_add(HEADER_LEN as u64))
            .ok_or_else(|| corrupt("vector file dimensions overflow"))?;
        if bytes.len() as u64 != expected_len {
            return Err(corrupt(&format!(
                "invalid vector byte length: expected {}, got {}",
                expected_len,
                bytes.len()
            )));
        }

        let mut data = Vec::with_capacity((rows * dim) as usize);
        for chunk in bytes[HEADER_LEN..].chunks_exact(4) {
            let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if !value.is_finite() {
                return Err(corrupt("embedding contains non-finite values"));
            }
            data.push(value);
        }

        Ok(Self {
            rows: rows as usize,
            dim: dim as usize,
            data,
        })
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn corrupt(message: &str) -> AppError {
    AppError::CorruptIndex {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_normalize_and_score() {
        let mut m = EmbeddingMatrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 2.0]]).unwrap();
        m.normalize_rows();
        let scores = m.scores(&[0.0, 1.0]);
        assert!((scores[0] - 0.8).abs() < 1e-6);
        assert!((scores[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_encode_decode() {
        let m = EmbeddingMatrix::from_rows(vec![vec![0.6, 0.8, 0.0], vec![-1.0, 0.0, 0.0]]).unwrap();
        let bytes = m.encode();
        assert_eq!(bytes.len(), HEADER_LEN + 6 * 4);
        assert_eq!(EmbeddingMatrix::decode(&bytes).unwrap(), m);
    }

    #[test]
    fn test_decode_rejects_truncation_and_bad_magic() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        let bytes = m.encode();

        let err = EmbeddingMatrix::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex { .. }));

        let mut bad = bytes.clone();
        bad[0] = b'X';
        assert!(EmbeddingMatrix::decode(&bad).is_err());
        assert!(EmbeddingMatrix::decode(b"RFI").is_err());
    }

    #[test]
    fn test_decode_rejects_zero_width_rows() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());

        let err = EmbeddingMatrix::decode(&bytes).unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex { .. }));
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        let m = EmbeddingMatrix::from_rows(vec![vec![f32::NAN]]).unwrap();
        assert!(EmbeddingMatrix::decode(&m.encode()).is_err());
    }
}
