use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::errors::{ChunkingError, ChunkingResult};

/// Infix that marks an already-produced artifact (`name_commented_<marker>.ext`).
pub const ARTIFACT_MARKER: &str = "_commented_";

const DEFAULT_EXTENSIONS: [&str; 5] = [".py", ".c", ".cpp", ".java", ".js"];

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Normalised to a leading dot.
    pub extensions: Vec<String>,
    pub exclude_patterns: Vec<Pattern>,
    pub follow_symlinks: bool,
    /// If false, ignore .gitignore, .ignore, and other ignore files.
    pub respect_ignore_files: bool,
    /// Skip files that look like previously written artifacts.
    pub skip_artifacts: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_patterns: Vec::new(),
            follow_symlinks: false,
            respect_ignore_files: true,
            skip_artifacts: true,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| ext.len() > 1)
            .collect();
        self
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> ChunkingResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }
}

/// Normalise `py`, `.py` and ` .py ` to `.py`.
pub(crate) fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Walks a root path and yields candidate source files.
#[derive(Debug, Clone, Default)]
pub struct FileDiscoverer {
    config: DiscoveryConfig,
}

impl FileDiscoverer {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover files under `root`, sorted by path.
    ///
    /// A root that is a file is returned as-is regardless of its extension.
    /// Unreadable directory entries are logged and skipped so one bad
    /// subtree never hides the rest of the tree.
    pub fn discover(&self, root: &Path) -> ChunkingResult<Vec<FileEntry>> {
        if !root.exists() {
            return Err(ChunkingError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let root = root.canonicalize()?;

        if root.is_file() {
            let size = root.metadata()?.len();
            return Ok(vec![FileEntry { path: root, size }]);
        }

        let walker = WalkBuilder::new(&root)
            .follow_links(self.config.follow_symlinks)
            .git_ignore(self.config.respect_ignore_files)
            .git_global(self.config.respect_ignore_files)
            .git_exclude(self.config.respect_ignore_files)
            .ignore(self.config.respect_ignore_files)
            .parents(self.config.respect_ignore_files)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable entry during discovery");
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            if !self.matches_extension(path) {
                continue;
            }
            if self.config.skip_artifacts && is_artifact(path) {
                debug!(path = %path.display(), "Skipping previously produced artifact");
                continue;
            }
            if self.should_exclude(&root, path) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(FileEntry {
                path: path.to_path_buf(),
                size,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %root.display(), count = files.len(), "Discovered source files");
        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.config.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Patterns match the path relative to `root` (`vendor/**`) or the
    /// absolute path (`**/vendor/**`).
    fn should_exclude(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.config
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative) || pattern.matches_path(path))
    }
}

fn is_artifact(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.contains(ARTIFACT_MARKER))
        .unwrap_or(false)
}
