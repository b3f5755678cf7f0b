//! Guideline document text extraction

use crate::constants::{EXCERPT_ELLIPSIS, EXCERPT_MAX_CHARS, NO_FILE_UPLOADED, PDF_FAILURE_PREFIX};
use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

/// Text shown in the "Extracted Guideline" panel for an optional upload.
/// The parser is never touched when no file is given.
pub fn extract_document_text(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return NO_FILE_UPLOADED.to_string();
    };

    match extract_pages(path) {
        Ok(text) => truncate_excerpt(&text, EXCERPT_MAX_CHARS),
        Err(e) => {
            warn!(error = %e, "PDF extraction failed");
            format!("{}{}", PDF_FAILURE_PREFIX, e)
        }
    }
}

/// Concatenate the text of every page in order. Pages without extractable text count as empty.
pub fn extract_pages(path: &Path) -> Result<String, PdfError> {
    let doc = Document::load(path).map_err(|source| PdfError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = doc.get_pages();
    let (text, empty_pages) = join_page_texts(
        pages
            .keys()
            .map(|&page_num| (page_num, doc.extract_text(&[page_num]))),
    );

    debug!(
        path = %path.display(),
        pages = pages.len(),
        empty_pages,
        chars = text.chars().count(),
        "PDF text extracted"
    );
    Ok(text)
}

/// Join page texts in the order given. Failed pages contribute nothing and are counted.
fn join_page_texts<E: std::fmt::Display>(
    pages: impl IntoIterator<Item = (u32, Result<String, E>)>,
) -> (String, usize) {
    let mut text = String::new();
    let mut empty_pages = 0usize;
    for (page_num, result) in pages {
        match result {
            Ok(content) => text.push_str(&content),
            Err(e) => {
                empty_pages += 1;
                debug!(page = page_num, error = %e, "No text on page");
            }
        }
    }
    (text, empty_pages)
}

/// First `max_chars` characters followed by the ellipsis marker
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(EXCERPT_ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one page per entry. `None` pages carry no content stream.
    fn write_pdf(path: &Path, pages: &[Option<&str>]) {
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
        for page_text in pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some(text) = page_text {
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
                page.set("Contents", content_id);
            }
            kids.push(doc.add_object(page).into());
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn no_file_gives_placeholder() {
        assert_eq!(extract_document_text(None), "No file uploaded.");
    }

    #[test]
    fn truncates_to_budget_plus_ellipsis() {
        let long = "a".repeat(5000);
        let out = truncate_excerpt(&long, EXCERPT_MAX_CHARS);
        assert_eq!(out.chars().count(), 2003);
        assert!(out.ends_with("a..."));

        // multi-byte characters count as one
        let arsenic = "砷".repeat(2500);
        let out = truncate_excerpt(&arsenic, EXCERPT_MAX_CHARS);
        assert_eq!(out.chars().count(), 2003);
    }

    #[test]
    fn short_text_still_gets_marker() {
        assert_eq!(truncate_excerpt("Lead limit 10 µg/L", 2000), "Lead limit 10 µg/L...");
        assert_eq!(truncate_excerpt("", 2000), "...");
    }

    #[test]
    fn unreadable_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-pdf.pdf");
        std::fs::write(&path, b"just some text, no pdf header").unwrap();

        let out = extract_document_text(Some(&path));
        assert!(out.starts_with(PDF_FAILURE_PREFIX), "{out}");
        assert!(out.contains("not-a-pdf.pdf"));
    }

    #[test]
    fn missing_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = extract_document_text(Some(&dir.path().join("gone.pdf")));
        assert!(out.starts_with(PDF_FAILURE_PREFIX));
    }

    #[test]
    fn generated_pdf_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guideline.pdf");
        write_pdf(&path, &[Some("Arsenic guideline value 10 ug/L")]);

        let out = extract_document_text(Some(&path));
        assert!(!out.starts_with(PDF_FAILURE_PREFIX), "{out}");
        assert!(out.contains("Arsenic guideline value 10 ug/L"), "{out}");
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= EXCERPT_MAX_CHARS + 3);
    }

    #[test]
    fn pages_are_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two-pages.pdf");
        write_pdf(&path, &[Some("Lead limit 10 ug/L"), Some("Chromium limit 50 ug/L")]);

        let text = extract_pages(&path).unwrap();
        let first = text.find("Lead limit 10 ug/L").expect("page 1 text");
        let second = text.find("Chromium limit 50 ug/L").expect("page 2 text");
        assert!(first < second, "{text}");
    }

    #[test]
    fn page_without_content_does_not_hide_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank-middle.pdf");
        write_pdf(&path, &[Some("Coagulation dose"), None, Some("Filtration rate")]);

        let out = extract_document_text(Some(&path));
        assert!(!out.starts_with(PDF_FAILURE_PREFIX), "{out}");
        assert!(out.contains("Coagulation dose"), "{out}");
        assert!(out.contains("Filtration rate"), "{out}");
    }

    #[test]
    fn failed_pages_count_as_empty() {
        let pages: Vec<(u32, Result<String, &str>)> = vec![
            (1, Ok("first ".to_string())),
            (2, Err("undecodable content stream")),
            (3, Ok("third".to_string())),
        ];
        let (text, empty_pages) = join_page_texts(pages);
        assert_eq!(text, "first third");
        assert_eq!(empty_pages, 1);

        let (text, empty_pages) = join_page_texts(vec![(1, Err::<String, _>("bad"))]);
        assert_eq!(text, "");
        assert_eq!(empty_pages, 1);
    }
}
