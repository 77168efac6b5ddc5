// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Repository set management.
//!
//! Holds the named repositories and their declared dependencies,
//! produces the dependency order, and persists the set to TOML or JSON.
//! The manager is process-wide state; mutations are serialized by the
//! owner threading it through request handlers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ConfigError, Result, SplitError, VcsError};
use crate::vcs::Vcs;

/// Directory marker identifying a Jujutsu repository.
const REPO_MARKER: &str = ".jj";

/// Directories skipped during repository discovery.
const DISCOVERY_SKIP: &[&str] = &["node_modules", "target", "vendor", "dist", "build"];

/// Maximum directory depth probed during discovery.
const DISCOVERY_DEPTH: usize = 4;

/// A managed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique repository name.
    pub name: String,
    /// Repository path.
    pub path: PathBuf,
    /// Names of repositories this one depends on. Dangling names are
    /// tolerated; ordering simply ignores them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// Serialized form of the repository set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RepositoriesFile {
    #[serde(default)]
    repositories: Vec<Repository>,
}

/// Mapping of name to repository, plus the root directory relative
/// paths resolve against.
#[derive(Debug, Clone, Default)]
pub struct RepositoryManager {
    root: PathBuf,
    repos: BTreeMap<String, Repository>,
}

impl RepositoryManager {
    /// Create an empty manager rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            repos: BTreeMap::new(),
        }
    }

    /// The manager's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The default persistence location under the user's config
    /// directory.
    pub fn default_store_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jjsplit").join("repositories.toml"))
    }

    /// Add or replace a repository.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        dependencies: Vec<String>,
    ) {
        let name = name.into();
        let repo = Repository {
            name: name.clone(),
            path: path.into(),
            dependencies,
        };
        self.repos.insert(name, repo);
    }

    /// Remove a repository. Other repositories' dependency lists are
    /// left untouched; the removed name simply dangles.
    pub fn remove(&mut self, name: &str) -> bool {
        self.repos.remove(name).is_some()
    }

    /// Look up a repository by name.
    pub fn get(&self, name: &str) -> Option<&Repository> {
        self.repos.get(name)
    }

    /// All repository names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.repos.keys().map(String::as_str).collect()
    }

    /// Number of managed repositories.
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Whether the manager is empty.
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Topological order over the present repositories, dependencies
    /// first. Dangling dependencies are ignored. Fails with
    /// [`SplitError::CyclicDependency`] when a cycle exists.
    pub fn dependency_order(&self) -> Result<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for (name, repo) in &self.repos {
            in_degree.entry(name.as_str()).or_insert(0);
            for dep in &repo.dependencies {
                if !self.repos.contains_key(dep) {
                    continue;
                }
                *in_degree.entry(name.as_str()).or_insert(0) += 1;
                dependents.entry(dep.as_str()).or_default().push(name);
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::new();

        while let Some(name) = queue.pop_front() {
            order.push(name.to_string());
            for &dependent in dependents.get(name).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() < self.repos.len() {
            let remaining = self
                .repos
                .keys()
                .filter(|name| !order.contains(*name))
                .cloned()
                .collect();
            return Err(SplitError::CyclicDependency { names: remaining });
        }
        Ok(order)
    }

    /// Whether the dependency graph over present repositories contains a
    /// cycle. Tri-state depth-first search.
    pub fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Visited,
        }

        fn visit(
            name: &str,
            repos: &BTreeMap<String, Repository>,
            marks: &mut HashMap<String, Mark>,
        ) -> bool {
            match marks.get(name).copied().unwrap_or(Mark::Unvisited) {
                Mark::Visiting => return true,
                Mark::Visited => return false,
                Mark::Unvisited => {}
            }
            marks.insert(name.to_string(), Mark::Visiting);
            if let Some(repo) = repos.get(name) {
                for dep in &repo.dependencies {
                    if repos.contains_key(dep) && visit(dep, repos, marks) {
                        return true;
                    }
                }
            }
            marks.insert(name.to_string(), Mark::Visited);
            false
        }

        let mut marks = HashMap::new();
        self.repos
            .keys()
            .any(|name| visit(name, &self.repos, &mut marks))
    }

    /// Check that a repository's path exists and the collaborator
    /// accepts it.
    pub fn validate_repository(&self, name: &str, vcs: &mut dyn Vcs) -> Result<()> {
        let repo = self.get(name).ok_or_else(|| {
            SplitError::invalid_input(format!("unknown repository: '{name}'"))
        })?;
        if !repo.path.exists() {
            return Err(SplitError::Vcs(VcsError::NotARepository {
                path: repo.path.clone(),
            }));
        }
        vcs.init(&repo.path)
    }

    /// Load a manager from a TOML or JSON file, chosen by extension with
    /// cross-format fallback. Any error yields an empty manager rooted
    /// at the file's directory; relative repository paths are resolved
    /// against that directory.
    pub fn load(path: &Path) -> Self {
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut manager = Self::new(root.clone());

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "repository store unreadable, starting empty");
                return manager;
            }
        };

        let parsed = match parse_store(path, &content) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "repository store unparseable, starting empty");
                return manager;
            }
        };

        for mut repo in parsed.repositories {
            if repo.path.is_relative() {
                repo.path = root.join(&repo.path);
            }
            manager.repos.insert(repo.name.clone(), repo);
        }
        manager
    }

    /// Save the manager to a TOML or JSON file, chosen by extension.
    /// Failures surface as [`ConfigError::SaveFailed`]; the in-memory
    /// state is unchanged either way.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = RepositoriesFile {
            repositories: self.repos.values().cloned().collect(),
        };
        let serialized = if has_extension(path, "json") {
            serde_json::to_string_pretty(&file).map_err(|e| {
                SplitError::Config(ConfigError::SaveFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            })?
        } else {
            toml::to_string_pretty(&file).map_err(|e| {
                SplitError::Config(ConfigError::SaveFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            })?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SplitError::Config(ConfigError::SaveFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })
                })?;
            }
        }
        std::fs::write(path, serialized).map_err(|e| {
            SplitError::Config(ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;
        tracing::debug!(path = %path.display(), repos = self.repos.len(), "repository store saved");
        Ok(())
    }

    /// Walk the root directory for repositories and register any that
    /// are not already managed. Returns the number added.
    pub fn discover(&mut self) -> usize {
        let mut added = 0;
        for entry in WalkDir::new(&self.root)
            .max_depth(DISCOVERY_DEPTH)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0
                    || ((!name.starts_with('.') || name == REPO_MARKER)
                        && !DISCOVERY_SKIP.contains(&name.as_ref()))
            })
            .flatten()
        {
            if entry.file_name().to_string_lossy() != REPO_MARKER || !entry.file_type().is_dir() {
                continue;
            }
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            let name = parent
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "root".to_string());
            if self.repos.contains_key(&name) {
                continue;
            }
            tracing::debug!(name = %name, path = %parent.display(), "discovered repository");
            self.add(name, parent.to_path_buf(), Vec::new());
            added += 1;
        }
        added
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

/// Parse store content, preferring the format the extension names and
/// falling back to the other on a format error.
fn parse_store(path: &Path, content: &str) -> Result<RepositoriesFile> {
    let (first, second): (
        fn(&str) -> Result<RepositoriesFile>,
        fn(&str) -> Result<RepositoriesFile>,
    ) = if has_extension(path, "json") {
        (parse_json, parse_toml)
    } else {
        (parse_toml, parse_json)
    };
    first(content).or_else(|_| second(content))
}

fn parse_toml(content: &str) -> Result<RepositoriesFile> {
    toml::from_str(content).map_err(|e| {
        SplitError::Config(ConfigError::ParseError {
            message: e.to_string(),
        })
    })
}

fn parse_json(content: &str) -> Result<RepositoriesFile> {
    serde_json::from_str(content).map_err(|e| {
        SplitError::Config(ConfigError::ParseError {
            message: e.to_string(),
        })
    })
}
