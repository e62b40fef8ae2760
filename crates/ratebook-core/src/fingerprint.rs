//! Row fingerprinting for merge and dedupe decisions.
//!
//! An identity fingerprint hashes the declared identity columns and names
//! a logical record. A content fingerprint hashes the integer-truncated
//! numeric comparison columns; truncation is deliberately coarse, so two
//! rates that differ only below the integer boundary (10.4 and 10.9)
//! produce the same content fingerprint. The combined fingerprint is the
//! concatenation of the two.

use sha2::Digest;

use ratebook_model::{CellValue, Fingerprint, PipelineError, Result, Row};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// The identity and numeric comparison columns a pipeline fingerprints by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintScheme {
    identity_columns: Vec<String>,
    numeric_columns: Vec<String>,
}

impl Default for FingerprintScheme {
    fn default() -> Self {
        Self::new(
            ["STATE", "CITY", "YEAR", "LEVEL", "TRADE"]
                .map(String::from)
                .to_vec(),
            ["BASE", "FRINGE"].map(String::from).to_vec(),
        )
    }
}

impl FingerprintScheme {
    pub fn new(identity_columns: Vec<String>, numeric_columns: Vec<String>) -> Self {
        Self {
            identity_columns,
            numeric_columns,
        }
    }

    pub fn identity_columns(&self) -> &[String] {
        &self.identity_columns
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Fingerprint of the identity column tuple.
    pub fn identity(&self, row: &Row) -> Result<Fingerprint> {
        let mut tag = String::new();
        for (pos, column) in self.identity_columns.iter().enumerate() {
            let value = row.get(column).ok_or_else(|| PipelineError::MissingColumn {
                column: column.clone(),
            })?;
            if pos > 0 {
                tag.push('|');
            }
            tag.push_str(&value.key_string());
        }
        Ok(Fingerprint::new(sha256_hex(tag.as_bytes())))
    }

    /// Fingerprint of the integer-truncated numeric comparison columns.
    pub fn content(&self, row: &Row) -> Result<Fingerprint> {
        let mut tag = String::new();
        for (pos, column) in self.numeric_columns.iter().enumerate() {
            let truncated = self.numeric(row, column)?.trunc() as i64;
            if pos > 0 {
                tag.push('|');
            }
            tag.push_str(&truncated.to_string());
        }
        Ok(Fingerprint::new(sha256_hex(tag.as_bytes())))
    }

    /// Identity and content fingerprints concatenated: unique to "this
    /// logical record with this approximate value".
    pub fn combined(&self, row: &Row) -> Result<Fingerprint> {
        Ok(self.identity(row)?.concat(&self.content(row)?))
    }

    /// Read a numeric comparison value, requiring a finite number.
    pub fn numeric(&self, row: &Row, column: &str) -> Result<f64> {
        let value = row.get(column).ok_or_else(|| PipelineError::MissingColumn {
            column: column.to_string(),
        })?;
        match value {
            CellValue::Number(number) if number.is_finite() => Ok(*number),
            other => Err(PipelineError::TypeMismatch {
                column: column.to_string(),
                expected: "number",
                found: other.kind().to_string(),
            }),
        }
    }
}
