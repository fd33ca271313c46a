//! In-memory hierarchical filesystem.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::sim::error::StoreError;

/// Children of a directory, keyed by entry name, in creation order.
pub type Directory = IndexMap<String, FsNode>;

/// A filesystem entry: a leaf file holding any value, or a directory.
///
/// Serializes as a nested mapping (directories become objects, files become
/// their value), which is the shape snapshots are inspected in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FsNode {
    File(Value),
    Directory(Directory),
}

impl FsNode {
    pub fn as_file(&self) -> Option<&Value> {
        match self {
            FsNode::File(value) => Some(value),
            FsNode::Directory(_) => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FsNode::Directory(_))
    }
}

/// Split a `/`-delimited path into its segments.
///
/// Leading and trailing slashes are ignored. The root itself and paths with
/// empty segments (`a//b`) are rejected.
pub fn parse_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let trimmed = path.trim_matches('/');
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(parts)
}

/// Dict-of-dicts filesystem with deep-copy snapshots.
#[derive(Debug, Clone, Default)]
pub struct Filesystem {
    root: Directory,
}

impl Filesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` as a file at `path`, creating missing parent directories.
    ///
    /// An existing entry at `path` is replaced. A file standing where a parent
    /// directory is needed is an error and leaves the tree unchanged.
    pub fn write(&mut self, path: &str, data: Value) -> Result<(), StoreError> {
        let parts = parse_path(path)?;
        let (leaf, parents) = split_leaf(path, &parts)?;

        // Reject before creating anything so a failed write has no effect.
        self.check_writable(parents)?;

        let mut dir = &mut self.root;
        for part in parents {
            let node = dir
                .entry((*part).to_string())
                .or_insert_with(|| FsNode::Directory(Directory::new()));
            dir = match node {
                FsNode::Directory(children) => children,
                FsNode::File(_) => {
                    return Err(StoreError::NotADirectory {
                        path: path.to_string(),
                    });
                }
            };
        }
        dir.insert(leaf.to_string(), FsNode::File(data));
        debug!(path, "fs write");
        Ok(())
    }

    pub fn read(&self, path: &str) -> Result<&FsNode, StoreError> {
        let parts = parse_path(path)?;
        let (leaf, parents) = split_leaf(path, &parts)?;
        let dir = self.parent_dir(path, parents)?;
        dir.get(leaf).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })
    }

    pub fn exists(&self, path: &str) -> bool {
        self.read(path).is_ok()
    }

    /// Remove the entry at `path`.
    ///
    /// Files and empty directories are always removable. A non-empty
    /// directory requires `recursive`, in which case the whole subtree goes
    /// in a single removal.
    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<(), StoreError> {
        let parts = parse_path(path)?;
        let (leaf, parents) = split_leaf(path, &parts)?;
        let dir = self.parent_dir_mut(path, parents)?;

        match dir.get(leaf) {
            None => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
            Some(FsNode::Directory(children)) if !children.is_empty() && !recursive => {
                return Err(StoreError::DirectoryNotEmpty {
                    path: path.to_string(),
                });
            }
            Some(_) => {}
        }
        dir.shift_remove(leaf);
        debug!(path, recursive, "fs delete");
        Ok(())
    }

    /// Independent deep copy of the whole tree.
    pub fn snapshot(&self) -> Directory {
        self.root.clone()
    }

    fn check_writable(&self, parents: &[&str]) -> Result<(), StoreError> {
        let mut dir = &self.root;
        for (depth, part) in parents.iter().enumerate() {
            match dir.get(*part) {
                Some(FsNode::Directory(children)) => dir = children,
                Some(FsNode::File(_)) => {
                    return Err(StoreError::NotADirectory {
                        path: format!("/{}", parents[..=depth].join("/")),
                    });
                }
                None => return Ok(()),
            }
        }
        Ok(())
    }

    fn parent_dir(&self, path: &str, parents: &[&str]) -> Result<&Directory, StoreError> {
        let mut dir = &self.root;
        for part in parents {
            dir = match dir.get(*part) {
                Some(FsNode::Directory(children)) => children,
                Some(FsNode::File(_)) => {
                    return Err(StoreError::NotADirectory {
                        path: path.to_string(),
                    });
                }
                None => {
                    return Err(StoreError::NotFound {
                        path: path.to_string(),
                    });
                }
            };
        }
        Ok(dir)
    }

    fn parent_dir_mut(
        &mut self,
        path: &str,
        parents: &[&str],
    ) -> Result<&mut Directory, StoreError> {
        let mut dir = &mut self.root;
        for part in parents {
            dir = match dir.get_mut(*part) {
                Some(FsNode::Directory(children)) => children,
                Some(FsNode::File(_)) => {
                    return Err(StoreError::NotADirectory {
                        path: path.to_string(),
                    });
                }
                None => {
                    return Err(StoreError::NotFound {
                        path: path.to_string(),
                    });
                }
            };
        }
        Ok(dir)
    }
}

fn split_leaf<'p, 'a>(
    path: &str,
    parts: &'p [&'a str],
) -> Result<(&'a str, &'p [&'a str]), StoreError> {
    match parts.split_last() {
        Some((leaf, parents)) => Ok((*leaf, parents)),
        None => Err(StoreError::InvalidPath {
            path: path.to_string(),
        }),
    }
}
