// word2vec file loading.
//
// Both word2vec layouts start with a "<vocab size> <dimensions>" header line.
// The text layout (.txt / .vec) follows with one "term v1 v2 ..." line per
// term. The binary layout follows each term and a single space with
// `dimensions` little-endian f32 values, optionally terminated by a newline.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::provider::Embedding;
use super::traits::VectorSpace;
use super::vectors::KeyedVectors;

/// Upper bound on terms reserved up front; larger files grow as they load.
const MAX_PREALLOCATED_TERMS: usize = 1 << 20;
/// Largest vector dimensionality accepted from a header.
const MAX_DIMENSIONS: usize = 1 << 16;

/// Load a word2vec file and wrap it as an [`Embedding`] under `id`.
pub fn load_embedding(id: &str, path: &Path) -> Result<Embedding> {
    let vectors = load_word2vec(path)?;
    info!(
        embedding = id,
        terms = vectors.len(),
        dimensions = vectors.dimensions(),
        "Loaded word embedding"
    );
    Ok(Embedding::new(id, vectors))
}

/// Load word2vec vectors, picking the layout from the file extension.
pub fn load_word2vec(path: &Path) -> Result<KeyedVectors> {
    let file =
        File::open(path).with_context(|| format!("Failed to open embedding {}", path.display()))?;
    let mut reader = BufReader::new(file);

    if is_text_format(path) {
        read_text(&mut reader)
            .with_context(|| format!("Invalid word2vec text file {}", path.display()))
    } else {
        read_binary(&mut reader)
            .with_context(|| format!("Invalid word2vec binary file {}", path.display()))
    }
}

fn is_text_format(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("txt") | Some("vec")
    )
}

fn read_header(reader: &mut impl BufRead) -> Result<(usize, usize)> {
    let mut line = String::new();
    reader.read_line(&mut line).context("Failed to read header")?;
    let mut parts = line.split_whitespace();
    let vocab_size = parts
        .next()
        .context("Missing vocabulary size in header")?
        .parse::<usize>()
        .context("Vocabulary size is not a number")?;
    let dimensions = parts
        .next()
        .context("Missing dimensions in header")?
        .parse::<usize>()
        .context("Dimensions is not a number")?;
    if dimensions == 0 {
        anyhow::bail!("Embedding dimensions must be positive");
    }
    if dimensions > MAX_DIMENSIONS {
        anyhow::bail!(
            "Header declares {} dimensions, more than the supported {}",
            dimensions,
            MAX_DIMENSIONS
        );
    }
    Ok((vocab_size, dimensions))
}

/// Parse the word2vec text layout.
pub fn read_text(reader: &mut impl BufRead) -> Result<KeyedVectors> {
    let (vocab_size, dimensions) = read_header(reader)?;
    let mut vectors =
        KeyedVectors::with_capacity(dimensions, vocab_size.min(MAX_PREALLOCATED_TERMS));
    let mut read = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read vector line")?;
        let mut parts = line.split_whitespace();
        let Some(term) = parts.next() else {
            continue;
        };
        let values = parts
            .map(|v| v.parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .with_context(|| format!("Bad vector value on line {}", line_no + 2))?;
        insert_term(&mut vectors, term, values)?;
        read += 1;
    }

    if read != vocab_size {
        anyhow::bail!("Header declares {} terms but {} were read", vocab_size, read);
    }
    Ok(vectors)
}

/// Parse the word2vec binary layout.
pub fn read_binary(reader: &mut impl BufRead) -> Result<KeyedVectors> {
    let (vocab_size, dimensions) = read_header(reader)?;
    let mut vectors =
        KeyedVectors::with_capacity(dimensions, vocab_size.min(MAX_PREALLOCATED_TERMS));
    let width = dimensions
        .checked_mul(4)
        .context("Header dimensions overflow the vector width")?;
    let mut raw = vec![0u8; width];

    for i in 0..vocab_size {
        let mut term_bytes = Vec::new();
        reader
            .read_until(b' ', &mut term_bytes)
            .with_context(|| format!("Failed to read term {}", i + 1))?;
        if term_bytes.last() == Some(&b' ') {
            term_bytes.pop();
        }
        // Some writers terminate each vector with a newline, which then
        // leads the next term.
        while term_bytes.first() == Some(&b'\n') {
            term_bytes.remove(0);
        }
        if term_bytes.is_empty() {
            anyhow::bail!("Unexpected end of file after {} of {} terms", i, vocab_size);
        }
        let term = String::from_utf8_lossy(&term_bytes).into_owned();

        reader
            .read_exact(&mut raw)
            .with_context(|| format!("Truncated vector for '{}'", term))?;
        let values = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        insert_term(&mut vectors, &term, values)?;
    }

    Ok(vectors)
}

/// Insert a parsed vector; a repeated term keeps the later vector.
fn insert_term(vectors: &mut KeyedVectors, term: &str, values: Vec<f32>) -> Result<()> {
    if vectors.contains(term) {
        warn!(term, "Duplicate term in embedding file, keeping the later vector");
    }
    vectors.insert(term, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_text() {
        let data = "2 3\nbank 1.0 0.0 0.0\nmoney 0.5 0.5 0.0\n";
        let kv = read_text(&mut Cursor::new(data)).unwrap();
        assert_eq!(kv.len(), 2);
        assert_eq!(kv.dimensions(), 3);
        assert!(kv.contains("money"));
    }

    #[test]
    fn test_read_text_count_mismatch() {
        let data = "3 2\nbank 1.0 0.0\n";
        assert!(read_text(&mut Cursor::new(data)).is_err());
    }

    #[test]
    fn test_read_text_duplicate_term_accepted() {
        let data = "3 2\nbank 1.0 0.0\nriver 0.0 1.0\nbank 0.5 0.5\n";
        let kv = read_text(&mut Cursor::new(data)).unwrap();
        assert_eq!(kv.len(), 2);
        assert_eq!(kv.vector("bank"), Some(&[0.5f32, 0.5][..]));
    }

    #[test]
    fn test_read_text_oversized_vocab_header() {
        let data = "18446744073709551615 3\nbank 1 0 0\n";
        assert!(read_text(&mut Cursor::new(data)).is_err());
    }

    #[test]
    fn test_read_binary_oversized_headers() {
        let huge_vocab = b"18446744073709551615 2\nbank ".to_vec();
        assert!(read_binary(&mut Cursor::new(huge_vocab)).is_err());

        let huge_dims = b"1 4611686018427387904\nbank ".to_vec();
        assert!(read_binary(&mut Cursor::new(huge_dims)).is_err());

        let huge_text_dims = "1 4611686018427387904\nbank 1\n";
        assert!(read_text(&mut Cursor::new(huge_text_dims)).is_err());
    }

    #[test]
    fn test_read_text_bad_header() {
        assert!(read_text(&mut Cursor::new("abc\n")).is_err());
    }

    #[test]
    fn test_read_binary() {
        let mut data = b"2 2\n".to_vec();
        for (term, v) in [("bank", [1.0f32, 0.0]), ("river", [0.0f32, 1.0])] {
            data.extend_from_slice(term.as_bytes());
            data.push(b' ');
            for x in v {
                data.extend_from_slice(&x.to_le_bytes());
            }
            data.push(b'\n');
        }
        let kv = read_binary(&mut Cursor::new(data)).unwrap();
        assert_eq!(kv.len(), 2);
        assert_eq!(kv.vector("river"), Some(&[0.0f32, 1.0][..]));
    }

    #[test]
    fn test_read_binary_truncated() {
        let mut data = b"1 2\nbank ".to_vec();
        data.extend_from_slice(&1.0f32.to_le_bytes());
        assert!(read_binary(&mut Cursor::new(data)).is_err());
    }
}
