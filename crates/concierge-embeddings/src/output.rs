//! Encoder output normalization.
//!
//! Different encoder backends hand back vectors in different shapes: a
//! row-major flat buffer with dimensions, a nested row list, or a single
//! vector for a one-text batch. The shapes are modeled as an explicit
//! tagged union with one recognizer branch each, normalized to rows before
//! any scoring happens.

use crate::error::EmbeddingError;

/// Raw encoder output in one of the recognized shapes.
#[derive(Debug, Clone)]
pub enum EncoderOutput {
    /// Row-major flat buffer plus tensor dimensions `[rows, cols, ..]`
    Flat { data: Vec<f32>, dims: Vec<usize> },
    /// Already-nested rows
    Rows(Vec<Vec<f32>>),
    /// A single vector (batch of one)
    Single(Vec<f32>),
}

impl EncoderOutput {
    /// Normalize into one vector per input text.
    pub fn into_rows(self) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            EncoderOutput::Flat { data, dims } => {
                if dims.len() < 2 {
                    return Err(EmbeddingError::InvalidOutput(format!(
                        "flat buffer needs at least 2 dims, got {:?}",
                        dims
                    )));
                }

                let rows = dims[0];
                let cols = dims[1];
                if data.len() < rows * cols {
                    return Err(EmbeddingError::InvalidOutput(format!(
                        "flat buffer of {} values cannot hold {}x{}",
                        data.len(),
                        rows,
                        cols
                    )));
                }

                Ok((0..rows)
                    .map(|row| data[row * cols..(row + 1) * cols].to_vec())
                    .collect())
            }
            EncoderOutput::Rows(rows) => Ok(rows),
            EncoderOutput::Single(values) => Ok(vec![values]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_buffer_splits_rows() {
        let output = EncoderOutput::Flat {
            data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            dims: vec![2, 3],
        };
        let rows = output.into_rows().unwrap();
        assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_flat_buffer_bad_dims() {
        let output = EncoderOutput::Flat {
            data: vec![1.0, 2.0],
            dims: vec![2],
        };
        assert!(output.into_rows().is_err());
    }

    #[test]
    fn test_flat_buffer_short_data() {
        let output = EncoderOutput::Flat {
            data: vec![1.0, 2.0, 3.0],
            dims: vec![2, 2],
        };
        assert!(output.into_rows().is_err());
    }

    #[test]
    fn test_rows_pass_through() {
        let output = EncoderOutput::Rows(vec![vec![1.0], vec![2.0]]);
        assert_eq!(output.into_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_single_wraps_one_row() {
        let output = EncoderOutput::Single(vec![1.0, 2.0]);
        assert_eq!(output.into_rows().unwrap(), vec![vec![1.0, 2.0]]);
    }
}
