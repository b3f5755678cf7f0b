//! Guideline document upload and extraction

use super::App;
use crate::pdf;
use eframe::egui;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

impl App {
    /// Open the native file dialog and extract the chosen PDF
    pub fn pick_document(&mut self, ctx: &egui::Context) {
        let last_dir = self
            .document_state
            .lock()
            .unwrap()
            .path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);

        let mut dialog = rfd::FileDialog::new()
            .set_title("Upload WHO/EPA PDF")
            .add_filter("PDF", &["pdf"]);
        if let Some(dir) = last_dir {
            dialog = dialog.set_directory(dir);
        }

        match dialog.pick_file() {
            Some(path) => self.load_document(ctx, Some(path)),
            None => debug!("File dialog closed without a selection"),
        }
    }

    /// Replace the extracted guideline text. `None` clears the upload.
    pub fn load_document(&mut self, ctx: &egui::Context, path: Option<PathBuf>) {
        let generation = self.document_state.lock().unwrap().begin(path.clone());

        let Some(path) = path else {
            let text = pdf::extract_document_text(None);
            self.document_state.lock().unwrap().finish(generation, text);
            return;
        };

        info!(path = %path.display(), "Extracting guideline document");
        let state = self.document_state.clone();
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let text = pdf::extract_document_text(Some(&path));
            if !state.lock().unwrap().finish(generation, text) {
                debug!(path = %path.display(), "Discarded stale extraction");
            }
            ctx.request_repaint();
        });
    }

    /// Accept a PDF dropped onto the window
    pub fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }

        match dropped.into_iter().find(|p| is_pdf(p)) {
            Some(path) => self.load_document(ctx, Some(path)),
            None => {
                warn!("Dropped files contained no PDF");
                self.show_toast("Only PDF files can be uploaded");
            }
        }
    }

    pub fn open_document_externally(&mut self) {
        let path = self.document_state.lock().unwrap().path.clone();
        if let Some(path) = path {
            if let Err(e) = open::that(&path) {
                warn!(error = %e, path = %path.display(), "Failed to open document");
                self.show_toast("Could not open the document");
            }
        }
    }

    pub fn copy_document_text(&mut self, ctx: &egui::Context) {
        let text = self.document_state.lock().unwrap().status.text().map(str::to_string);
        if let Some(text) = text {
            ctx.copy_text(text);
            self.show_toast("Extracted text copied to clipboard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_check() {
        assert!(is_pdf(Path::new("guides/EPA-lead.pdf")));
        assert!(is_pdf(Path::new("WHO.PDF")));
        assert!(!is_pdf(Path::new("notes.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
