//! Spreadsheet export.
//!
//! Writes a fixed bold header row plus one row per record into an xlsx
//! workbook and returns it base64-encoded; the client reconstructs the binary
//! and triggers a download under a fixed per-entity filename. The whole
//! dataset and workbook are materialized in memory; `export.max_rows` bounds
//! the worst case.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rust_xlsxwriter::{Format, Workbook};

use crate::config::ExportConfig;
use crate::services::error::DomainError;

/// Base64-encoded workbook plus the fixed download filename.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub file_name: String,
    pub content_base64: String,
}

pub struct Exporter {
    column_width: f64,
    max_rows: usize,
}

impl Exporter {
    #[must_use]
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            column_width: config.column_width,
            max_rows: config.max_rows,
        }
    }

    /// Builds a workbook with the given header and rows. Zero rows still
    /// yields a valid workbook containing only the header.
    pub fn build(
        &self,
        file_name: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<ExportPayload, DomainError> {
        if rows.len() > self.max_rows {
            return Err(DomainError::Validation(format!(
                "Export exceeds the configured limit of {} rows",
                self.max_rows
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();

        for (col, header) in headers.iter().enumerate() {
            let col = u16::try_from(col)
                .map_err(|_| DomainError::Internal("Too many export columns".to_string()))?;
            worksheet
                .write_with_format(0, col, *header, &header_format)
                .map_err(|e| DomainError::Internal(format!("Failed to write header: {e}")))?;
            worksheet
                .set_column_width(col, self.column_width)
                .map_err(|e| DomainError::Internal(format!("Failed to set column width: {e}")))?;
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let row_idx = u32::try_from(row_idx + 1)
                .map_err(|_| DomainError::Internal("Too many export rows".to_string()))?;
            for (col, cell) in row.iter().enumerate() {
                let col = u16::try_from(col)
                    .map_err(|_| DomainError::Internal("Too many export columns".to_string()))?;
                worksheet
                    .write(row_idx, col, cell)
                    .map_err(|e| DomainError::Internal(format!("Failed to write cell: {e}")))?;
            }
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| DomainError::Internal(format!("Failed to build workbook: {e}")))?;

        Ok(ExportPayload {
            file_name: file_name.to_string(),
            content_base64: BASE64.encode(buffer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exporter() -> Exporter {
        Exporter::new(&ExportConfig::default())
    }

    #[test]
    fn test_empty_export_is_header_only_workbook() {
        let payload = exporter()
            .build("Empty.xlsx", &["Company", "Permit"], &[])
            .unwrap();

        assert_eq!(payload.file_name, "Empty.xlsx");
        let bytes = BASE64.decode(payload.content_base64).unwrap();
        // xlsx is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_rows_written() {
        let rows = vec![
            vec!["Ladang Hijau".to_string(), "PN-001".to_string()],
            vec!["Sayur Segar".to_string(), "PN-002".to_string()],
        ];
        let payload = exporter()
            .build("Data.xlsx", &["Company", "Permit"], &rows)
            .unwrap();

        let bytes = BASE64.decode(payload.content_base64).unwrap();
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_row_cap_enforced() {
        let exporter = Exporter::new(&ExportConfig {
            column_width: 20.0,
            max_rows: 1,
        });
        let rows = vec![vec!["a".to_string()], vec!["b".to_string()]];
        assert!(matches!(
            exporter.build("Data.xlsx", &["H"], &rows),
            Err(DomainError::Validation(_))
        ));
    }
}
