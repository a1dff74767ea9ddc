use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DirectoryError;

/// Joins teacher principal ids to the display names that classes, sessions
/// and calendar events carry as their instructor.
pub trait IdentityDirectory {
    fn display_name(&self, teacher_id: &str) -> Option<&str>;

    fn teacher_id(&self, display_name: &str) -> Option<&str>;
}

/// An in-memory directory. Names are unique, so the reverse lookup is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDirectory {
    entries: BTreeMap<String, String>,
}

impl StaticDirectory {
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (id, name) in entries {
            let (id, name) = (id.into(), name.into());
            let claimed = map
                .iter()
                .find(|(other, value)| **value == name && **other != id);
            if let Some((first, _)) = claimed {
                return Err(DirectoryError::DuplicateName {
                    name,
                    first: first.clone(),
                    second: id,
                });
            }
            map.insert(id, name);
        }
        Ok(Self { entries: map })
    }

    /// Reads a JSON object of `{"teacher_id": "Display Name"}` pairs.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| DirectoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let directory = Self::from_entries(entries)?;
        tracing::debug!(
            path = %path.display(),
            teachers = directory.entries.len(),
            "loaded identity directory"
        );
        Ok(directory)
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        let entries = [
            ("teacher_1", "Dr. Sarah Wilson"),
            ("teacher_2", "Prof. Michael Chen"),
            ("teacher_3", "Dr. Emma Rodriguez"),
            ("teacher_4", "Prof. Jane Smith"),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl IdentityDirectory for StaticDirectory {
    fn display_name(&self, teacher_id: &str) -> Option<&str> {
        self.entries.get(teacher_id).map(String::as_str)
    }

    fn teacher_id(&self, display_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, name)| name.as_str() == display_name)
            .map(|(id, _)| id.as_str())
    }
}
