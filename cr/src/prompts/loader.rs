//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::PromptError;
use super::embedded;

/// Resolves prompt template sources by name
#[derive(Debug, Clone, Default)]
pub struct PromptLoader {
    /// Directory from config (`prompts.dir`), checked first
    extra_dir: Option<PathBuf>,
    /// User override directory (e.g., `.chainroute/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader rooted at `root`
    ///
    /// Looks for `.chainroute/prompts/` and `prompts/` under `root`; missing
    /// directories are skipped.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".chainroute/prompts");
        let repo_dir = root.join("prompts");

        let user_dir_exists = user_dir.is_dir();
        let repo_dir_exists = repo_dir.is_dir();
        debug!(?user_dir, %user_dir_exists, ?repo_dir, %repo_dir_exists, "PromptLoader::new: checking directories");

        Self {
            extra_dir: None,
            user_dir: user_dir_exists.then_some(user_dir),
            repo_dir: repo_dir_exists.then_some(repo_dir),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self::default()
    }

    /// Search `dir` before every other location
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(?dir, "PromptLoader::with_dir: called");
        self.extra_dir = Some(dir);
        self
    }

    /// Load a template source by name
    ///
    /// Checks in order:
    /// 1. Configured directory: `{dir}/{name}.pmt`
    /// 2. User override: `.chainroute/prompts/{name}.pmt`
    /// 3. Repo default: `prompts/{name}.pmt`
    /// 4. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String, PromptError> {
        debug!(%name, "PromptLoader::load_template: called");
        let dirs = [&self.extra_dir, &self.user_dir, &self.repo_dir];
        for dir in dirs.into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.is_file() {
                debug!(?path, "PromptLoader::load_template: found on disk");
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source });
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(PromptError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_embedded_only() {
        let loader = PromptLoader::embedded_only();
        let router = loader.load_template("router").unwrap();
        assert!(router.contains("triagem"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let err = loader.load_template("ortopedia").unwrap_err();
        assert!(matches!(err, PromptError::NotFound(ref n) if n == "ortopedia"));
    }

    #[test]
    fn test_user_override_beats_repo_and_embedded() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join(".chainroute/prompts")).unwrap();
        fs::create_dir_all(root.path().join("prompts")).unwrap();
        fs::write(root.path().join(".chainroute/prompts/default.pmt"), "user {{user_input}}").unwrap();
        fs::write(root.path().join("prompts/default.pmt"), "repo {{user_input}}").unwrap();
        fs::write(root.path().join("prompts/psicologia.pmt"), "repo psi {{user_input}}").unwrap();

        let loader = PromptLoader::new(root.path());
        assert_eq!(loader.load_template("default").unwrap(), "user {{user_input}}");
        assert_eq!(loader.load_template("psicologia").unwrap(), "repo psi {{user_input}}");
        assert!(loader.load_template("pediatria").unwrap().contains("pediatria"));
    }

    #[test]
    fn test_configured_dir_checked_first() {
        let root = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("prompts")).unwrap();
        fs::write(root.path().join("prompts/extract.pmt"), "repo {{text_input}}").unwrap();
        fs::write(extra.path().join("extract.pmt"), "extra {{text_input}}").unwrap();

        let loader = PromptLoader::new(root.path()).with_dir(extra.path());
        assert_eq!(loader.load_template("extract").unwrap(), "extra {{text_input}}");
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(root.path());
        assert!(loader.load_template("recommend").unwrap().contains("{{search_criteria}}"));
    }
}
