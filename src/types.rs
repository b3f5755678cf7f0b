//! Common types and data structures

use std::path::PathBuf;

/// Status of a background job feeding one output panel
#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    Idle,
    Running,
    Done(String),
}

impl JobStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Running)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            JobStatus::Done(text) => Some(text),
            _ => None,
        }
    }
}

/// State of the AI explanation panel
pub struct ExplainState {
    pub status: JobStatus,
    pub generation: u64, // bumped per request, stale results are dropped
    pub pollutant: String,
}

impl Default for ExplainState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            generation: 0,
            pollutant: String::new(),
        }
    }
}

impl ExplainState {
    /// Start a new request and return its generation
    pub fn begin(&mut self, pollutant: &str) -> u64 {
        self.generation += 1;
        self.status = JobStatus::Running;
        self.pollutant = pollutant.to_string();
        self.generation
    }

    /// Store a result if it belongs to the current request. Returns false for stale results.
    pub fn finish(&mut self, generation: u64, text: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.status = JobStatus::Done(text);
        true
    }

    /// Drop the in-flight request; its result will be stale when it arrives
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.status = JobStatus::Idle;
    }
}

/// State of the extracted guideline panel
pub struct DocumentState {
    pub status: JobStatus,
    pub generation: u64,
    pub path: Option<PathBuf>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            generation: 0,
            path: None,
        }
    }
}

impl DocumentState {
    pub fn begin(&mut self, path: Option<PathBuf>) -> u64 {
        self.generation += 1;
        self.status = JobStatus::Running;
        self.path = path;
        self.generation
    }

    pub fn finish(&mut self, generation: u64, text: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.status = JobStatus::Done(text);
        true
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_explanation_is_dropped() {
        let mut state = ExplainState::default();
        let first = state.begin("lead");
        let second = state.begin("arsenic");
        assert!(!state.finish(first, "old".into()));
        assert!(state.status.is_running());
        assert!(state.finish(second, "new".into()));
        assert_eq!(state.status.text(), Some("new"));
        assert_eq!(state.pollutant, "arsenic");
    }

    #[test]
    fn cancelled_explanation_ignores_late_result() {
        let mut state = ExplainState::default();
        let gen = state.begin("chromium");
        state.cancel();
        assert_eq!(state.status, JobStatus::Idle);
        assert!(!state.finish(gen, "late".into()));
        assert_eq!(state.status, JobStatus::Idle);
    }

    #[test]
    fn document_file_name() {
        let mut state = DocumentState::default();
        assert_eq!(state.file_name(), None);
        let gen = state.begin(Some(PathBuf::from("/tmp/guides/who-arsenic.pdf")));
        assert_eq!(state.file_name().as_deref(), Some("who-arsenic.pdf"));
        assert!(state.finish(gen, "text...".into()));
        assert_eq!(state.status, JobStatus::Done("text...".into()));
    }
}
