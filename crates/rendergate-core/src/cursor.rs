//! Cursors: focused views into a persistent structure
//!
//! A cursor remembers a root [`Structure`] and a [`Path`] inside it. Writing
//! through a cursor produces a new root and a new cursor at the same path; the
//! old cursor keeps pointing at the old data.

use crate::error::Result;
use crate::structure::{Path, Segment, Structure};
use crate::value::Value;
use serde::{Serialize, Serializer};
use std::fmt;

/// A path into a persistent structure
#[derive(Clone)]
pub struct Cursor {
    root: Structure,
    path: Path,
}

impl Cursor {
    /// Create a cursor focused on the whole structure
    pub fn new(root: Structure) -> Self {
        Self {
            root,
            path: Path::new(),
        }
    }

    /// Create a cursor focused on `path` inside `root`
    pub fn at(root: Structure, path: Path) -> Self {
        Self { root, path }
    }

    /// The structure this cursor reads from
    pub fn root(&self) -> &Structure {
        &self.root
    }

    /// The path from the root to the focused value
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// The focused value, or `Undefined` if the path does not exist
    ///
    /// Nested structures come back as cheap handles, so the result is
    /// identical to what is stored in the root.
    pub fn value(&self) -> Value {
        if self.path.is_empty() {
            return Value::Structure(self.root.clone());
        }
        self.root.get_in(&self.path).cloned().unwrap_or_default()
    }

    /// Create a cursor focused further down from this one
    pub fn cursor(&self, sub_path: &[Segment]) -> Cursor {
        let mut path = self.path.clone();
        path.extend_from_slice(sub_path);
        Self {
            root: self.root.clone(),
            path,
        }
    }

    /// Replace the focused value, returning a cursor over the new root
    pub fn set(&self, value: Value) -> Result<Cursor> {
        let root = self.root.set_in(&self.path, value)?;
        Ok(Self {
            root,
            path: self.path.clone(),
        })
    }

    /// Transform the focused value, returning a cursor over the new root
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> Result<Cursor> {
        let root = self.root.update_in(&self.path, f)?;
        Ok(Self {
            root,
            path: self.path.clone(),
        })
    }

    /// Same root node and same path
    pub fn is_identical(&self, other: &Cursor) -> bool {
        self.root.ptr_eq(&other.root) && self.path == other.path
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("path", &self.path)
            .field("value", &self.value())
            .finish()
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}
