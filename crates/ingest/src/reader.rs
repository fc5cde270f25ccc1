use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

pub struct PdfReader;

impl PdfReader {
    /// Text of every page, pages separated by a newline. An unreadable PDF is logged
    /// and yields empty text instead of an error.
    pub async fn read_pdf(path: &Path) -> String {
        match Self::try_read_pdf(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error reading PDF");
                String::new()
            }
        }
    }

    async fn try_read_pdf(path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .await
            .context(format!("Failed to read file: {:?}", path))?;

        // pdf-extract is CPU bound; keep it off the async workers.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .context("PDF extraction task panicked")?
        .map_err(|e| anyhow::anyhow!("Failed to extract PDF text: {}", e))?;

        tracing::debug!(path = %path.display(), pages = pages.len(), "Read PDF");
        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// A minimal PDF with one line of Courier text per page.
    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_pages_are_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_pages.pdf");
        write_pdf(&path, &["Alice met Bob.", "Acme Corp developed a vaccine."]);

        let text = PdfReader::read_pdf(&path).await;

        assert!(text.contains("Alice met Bob."), "got {:?}", text);
        assert!(text.contains("Acme Corp developed a vaccine."), "got {:?}", text);
        assert!(!text.contains("Bob.Acme"), "pages fused: {:?}", text);

        let first = text.find("Bob.").unwrap() + "Bob.".len();
        let second = text.find("Acme").unwrap();
        assert!(text[first..second].contains('\n'));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 not really a pdf").unwrap();

        assert_eq!(PdfReader::read_pdf(&path).await, "");
    }

    #[tokio::test]
    async fn test_missing_pdf_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PdfReader::read_pdf(&dir.path().join("absent.pdf")).await, "");
    }
}
