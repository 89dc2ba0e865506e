/// Turns an uploaded document into plain text.
///
/// Extraction is best effort: failures produce an empty string, never an error.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> String;
}

/// Reads documents that are already UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "document is not valid UTF-8 text");
                String::new()
            }
        }
    }
}

/// Text layer of a PDF. Scanned pages without text come back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        // Some malformed fonts make the decoder panic instead of erroring.
        let decoded = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
        match decoded {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                tracing::warn!(error = ?err, "could not read PDF text");
                String::new()
            }
            Err(_) => {
                tracing::warn!("PDF decoder panicked");
                String::new()
            }
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Picks the PDF or plain-text reader from the document's leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        if bytes.starts_with(PDF_MAGIC) {
            PdfTextExtractor.extract(bytes)
        } else {
            PlainTextExtractor.extract(bytes)
        }
    }
}
