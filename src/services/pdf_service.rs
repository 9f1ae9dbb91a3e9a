use lopdf::Document;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("The PDF could not be read: {0}")]
    Unreadable(String),

    #[error("No text could be extracted from the PDF")]
    NoText,
}

/// Pulls the text layer out of a PDF, one page at a time.
///
/// Pages are joined with a line break. A page whose text cannot be decoded is
/// skipped and logged; only a document that cannot be parsed at all is an
/// error. A parsable document without any text yields an empty string, which
/// callers report separately as [`ExtractionError::NoText`].
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let pages = document.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => {
                let text = text.trim_end();
                if !text.trim().is_empty() {
                    texts.push(text.to_string());
                }
            }
            Err(e) => {
                tracing::warn!(page = *page_number, error = %e, "skipping unreadable PDF page");
            }
        }
    }

    tracing::debug!(pages = pages.len(), readable = texts.len(), "extracted PDF text");
    Ok(texts.join("\n"))
}

/// Async wrapper that keeps PDF parsing off the request executor.
pub async fn extract_pdf_text_blocking(bytes: bytes::Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("extraction task failed: {}", e)))?
}

/// PDF fixtures shared by unit and HTTP tests.
#[doc(hidden)]
pub mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Builds a PDF with one page per entry; `None` produces a page without
    /// a content stream.
    pub fn build(pages: &[Option<&str>]) -> lopdf::Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for page in pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            };
            if let Some(text) = page {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
                page_dict.set("Contents", content_id);
            }
            kids.push(Object::Reference(doc.add_object(page_dict)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf)?;
        Ok(buf)
    }
}
