//! services/web/src/adapters/extract.rs
//!
//! Text extraction for uploaded documents. The format is chosen from the
//! filename suffix; parsing runs on the blocking pool.

use bytes::Bytes;
use docx_rs::read_docx;
use pdf_extract::extract_text_from_mem;
use serde_json::Value;
use std::path::Path;
use tracing::error;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF files (.pdf)
    Pdf,
    /// Word documents (.docx)
    Word,
}

/// Errors that can occur while turning an upload into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type. Please upload a PDF or Word document.")]
    UnsupportedFormat(String),

    /// The cause is logged, never shown.
    #[error("Error extracting text from the uploaded file.")]
    Failed(String),
}

/// Detect document format from the uploaded file's name.
pub fn detect_format(file_name: &str) -> Result<DocumentFormat, ExtractError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| ExtractError::UnsupportedFormat(file_name.to_string()))?;

    match extension.to_lowercase().as_str() {
        "pdf" => Ok(DocumentFormat::Pdf),
        "docx" => Ok(DocumentFormat::Word),
        _ => Err(ExtractError::UnsupportedFormat(file_name.to_string())),
    }
}

/// Extracts the text of an uploaded document.
pub async fn extract_text(file_name: &str, data: Bytes) -> Result<String, ExtractError> {
    let format = detect_format(file_name)?;

    let result = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => extract_pdf(&data),
        DocumentFormat::Word => extract_docx(&data),
    })
    .await
    .map_err(|e| ExtractError::Failed(format!("extraction task aborted: {}", e)))
    .and_then(|inner| inner);

    if let Err(ExtractError::Failed(ref cause)) = result {
        error!(file_name, cause = %cause, "Document extraction failed");
    }
    result
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractError> {
    extract_text_from_mem(data)
        .map_err(|e| ExtractError::Failed(format!("PDF extraction error: {}", e)))
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let docx = read_docx(data)
        .map_err(|e| ExtractError::Failed(format!("Word document parsing error: {}", e)))?;

    let json: Value = serde_json::from_str(&docx.json())
        .map_err(|e| ExtractError::Failed(format!("JSON parsing error: {}", e)))?;

    let paragraphs = json
        .get("document")
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter(|child| child.get("type").and_then(Value::as_str) == Some("paragraph"))
                .map(|paragraph| {
                    let mut text = String::new();
                    collect_text(paragraph, &mut text);
                    text
                })
                .filter(|text| !text.trim().is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Ok(paragraphs.join("\n"))
}

/// Appends every text node below `node` (runs, hyperlinks, ...) to `out`.
fn collect_text(node: &Value, out: &mut String) {
    let Some(data) = node.get("data") else {
        return;
    };
    if node.get("type").and_then(Value::as_str) == Some("text") {
        if let Some(text) = data.get("text").and_then(Value::as_str) {
            out.push_str(text);
        }
        return;
    }
    if let Some(children) = data.get("children").and_then(Value::as_array) {
        for child in children {
            collect_text(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Bytes {
        let mut docx = Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        Bytes::from(cursor.into_inner())
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("report.pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(detect_format("Report.PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(detect_format("notes.docx").unwrap(), DocumentFormat::Word);
        assert!(matches!(
            detect_format("notes.txt"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format("README"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_word_paragraphs_joined() {
        let data = docx_bytes(&["First paragraph.", "Second paragraph."]);
        let text = extract_text("essay.docx", data).await.unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_generic_failure() {
        let err = extract_text("broken.pdf", Bytes::from_static(b"not a pdf at all"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
        assert_eq!(err.to_string(), "Error extracting text from the uploaded file.");
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_generic_failure() {
        let err = extract_text("broken.docx", Bytes::from_static(b"PK garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }
}
