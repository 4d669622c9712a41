//! Swarm directory layout materialization.
//!
//! `materialize_layout` creates the fixed directory skeleton the external
//! orchestrator expects (`agents/`, `memory-store/`, `sessions/`,
//! `workflows/`) plus one file per selected agent holding that agent's
//! specialization block. This is the only bit-exact structural contract
//! the core owns; where the configuration document itself lands is the
//! caller's choice.
//!
//! Calls targeting different roots are independent. Within a single root,
//! concurrent calls must be serialized by the caller; no internal locking
//! is provided.

use crate::config::{Configuration, Specialization};
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectories created under the root path.
pub const LAYOUT_DIRS: &[&str] = &["agents", "memory-store", "sessions", "workflows"];

/// Per-agent file content: the agent id plus its specialization block.
#[derive(Serialize)]
struct AgentFile<'a> {
    id: &'a str,
    #[serde(flatten)]
    specialization: &'a Specialization,
}

/// Idempotently materialize the swarm layout under `root_path`.
///
/// Creates the fixed subdirectory set and writes `agents/<id>.json` for
/// every selected agent (overwrite-in-place; re-running with the same
/// inputs produces the same file set and contents and never errors).
/// Each filesystem operation is retried once to tolerate transient locks,
/// then surfaced verbatim as a `Filesystem` error.
///
/// Returns the list of created paths.
pub fn materialize_layout(config: &Configuration, root_path: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    for dir in LAYOUT_DIRS {
        let path = root_path.join(dir);
        with_retry(&path, || fs::create_dir_all(&path))?;
        created.push(path);
    }

    let agents_dir = root_path.join("agents");
    for id in &config.agents.selected {
        // validate() guarantees a specialization per selected agent
        let specialization = config.agents.specializations.get(id).ok_or_else(|| {
            Error::SchemaInvariant(format!("agent '{}' has no specialization block", id))
        })?;

        let file = AgentFile {
            id,
            specialization,
        };
        let mut content = serde_json::to_string_pretty(&file)?;
        content.push('\n');

        let path = agents_dir.join(format!("{}.json", id));
        with_retry(&path, || fs::write(&path, &content))?;
        created.push(path);
    }

    Ok(created)
}

/// Run a filesystem operation, retrying exactly once on failure.
fn with_retry<T>(path: &Path, op: impl Fn() -> std::io::Result<T>) -> Result<T> {
    match op() {
        Ok(value) => Ok(value),
        Err(_) => op().map_err(|source| Error::Filesystem {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AgentCatalog;
    use crate::synth::{ConfigSynthesizer, OrchestratorOverrides};
    use std::collections::BTreeMap;

    fn sample_config() -> Configuration {
        let catalog = AgentCatalog::embedded();
        ConfigSynthesizer::new(&catalog)
            .synthesize(
                &["queen".to_string(), "tester".to_string()],
                None,
                "Build a REST API",
                &OrchestratorOverrides::default(),
            )
            .unwrap()
    }

    fn snapshot(root: &Path) -> BTreeMap<PathBuf, String> {
        let mut files = BTreeMap::new();
        for entry in walk(root) {
            if entry.is_file() {
                files.insert(entry.clone(), fs::read_to_string(&entry).unwrap());
            }
        }
        files
    }

    fn walk(root: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path.clone());
                }
                paths.push(path);
            }
        }
        paths
    }

    #[test]
    fn test_materialize_creates_skeleton_and_agent_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = sample_config();

        let created = materialize_layout(&config, dir.path()).unwrap();

        for sub in LAYOUT_DIRS {
            assert!(dir.path().join(sub).is_dir(), "missing {}", sub);
        }
        assert!(dir.path().join("agents/queen.json").is_file());
        assert!(dir.path().join("agents/tester.json").is_file());
        // 4 dirs + 2 agent files
        assert_eq!(created.len(), 6);
    }

    #[test]
    fn test_agent_file_contains_specialization() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = sample_config();

        materialize_layout(&config, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("agents/queen.json")).unwrap();
        assert!(content.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["id"], "queen");
        assert_eq!(parsed["role"], "queen");
        assert!(parsed["verification"]["truthThreshold"].is_number());
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = sample_config();

        let first = materialize_layout(&config, dir.path()).unwrap();
        let before = snapshot(dir.path());

        let second = materialize_layout(&config, dir.path()).unwrap();
        let after = snapshot(dir.path());

        assert_eq!(first, second);
        assert_eq!(before, after, "re-running must not change the file set");
    }

    #[test]
    fn test_materialize_overwrites_stale_agent_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = sample_config();

        fs::create_dir_all(dir.path().join("agents")).unwrap();
        fs::write(dir.path().join("agents/queen.json"), "stale").unwrap();

        materialize_layout(&config, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("agents/queen.json")).unwrap();
        assert!(!content.contains("stale"));
        assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_surfaces_filesystem_errors() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let config = sample_config();

        // Read-only root: directory creation fails even after the retry
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let err = materialize_layout(&config, dir.path()).unwrap_err();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
