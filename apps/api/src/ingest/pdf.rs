use tracing::warn;

/// Plain text of a PDF. Unreadable documents yield an empty string; the
/// caller decides how to report that.
pub fn extract_text(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Failed to extract text from PDF ({} bytes): {e}", bytes.len());
            String::new()
        }
        Err(_) => {
            warn!("PDF extractor panicked on a {} byte document", bytes.len());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_yields_empty_text() {
        assert_eq!(extract_text(b"definitely not a pdf"), "");
    }

    #[test]
    fn test_empty_input_yields_empty_text() {
        assert_eq!(extract_text(&[]), "");
    }
}
