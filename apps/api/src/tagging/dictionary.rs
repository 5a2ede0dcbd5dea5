//! Tag dictionary: the closed vocabularies every extraction is validated against.
//!
//! A `TagDictionary` is built once from `DictionarySources` and never mutated.
//! `DictionaryStore` holds the current one behind an `Arc`; a reload builds a complete
//! new dictionary first and then swaps the pointer, so readers only ever see a whole one.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

pub const COUNTRIES_FILE: &str = "countries_dict.json";
pub const DEGREES_FILE: &str = "degrees_dict.json";
pub const MAJORS_FILE: &str = "majors_dict.json";

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty {kind} name")]
    EmptyName { kind: &'static str },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("sub-major '{sub_major}' references missing major '{parent}'")]
    MissingParent { sub_major: String, parent: String },

    #[error("sub-major '{name}' is listed under both '{first}' and '{second}'")]
    SubMajorCollision {
        name: String,
        first: String,
        second: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

/// Raw, unchecked dictionary input. Order is preserved into the prompt.
#[derive(Debug, Clone, Default)]
pub struct DictionarySources {
    pub countries: Vec<String>,
    pub degrees: Vec<String>,
    pub majors: Vec<String>,
    pub sub_majors: Vec<SubMajorSource>,
}

#[derive(Debug, Clone)]
pub struct SubMajorSource {
    pub name: String,
    pub parent: String,
}

/// Either `{"name": id, ...}` or `["name", ...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameList {
    Keyed(Map<String, Value>),
    Plain(Vec<String>),
}

impl Default for NameList {
    fn default() -> Self {
        NameList::Plain(Vec::new())
    }
}

impl NameList {
    fn into_names(self) -> Vec<String> {
        match self {
            NameList::Keyed(map) => map.into_iter().map(|(name, _)| name).collect(),
            NameList::Plain(names) => names,
        }
    }
}

/// One top-level entry of `majors_dict.json`.
#[derive(Debug, Deserialize)]
struct MajorNode {
    #[serde(default)]
    children: NameList,
}

impl DictionarySources {
    /// Reads the three dictionary files from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, DictionaryError> {
        let countries: NameList = read_json(&dir.join(COUNTRIES_FILE))?;
        let degrees: NameList = read_json(&dir.join(DEGREES_FILE))?;

        let majors_path = dir.join(MAJORS_FILE);
        let majors_raw: Map<String, Value> = read_json(&majors_path)?;

        let mut majors = Vec::with_capacity(majors_raw.len());
        let mut sub_majors = Vec::new();
        for (major, node) in majors_raw {
            let node: MajorNode =
                serde_json::from_value(node).map_err(|source| DictionaryError::Decode {
                    path: majors_path.clone(),
                    source,
                })?;
            sub_majors.extend(node.children.into_names().into_iter().map(|name| {
                SubMajorSource {
                    name,
                    parent: major.clone(),
                }
            }));
            majors.push(major);
        }

        Ok(Self {
            countries: countries.into_names(),
            degrees: degrees.into_names(),
            majors,
            sub_majors,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DictionaryError> {
    let text = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DictionaryError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// TagDictionary
// ────────────────────────────────────────────────────────────────────────────

/// A major category with its sub-majors, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MajorCategory {
    pub name: String,
    pub sub_majors: Vec<String>,
}

/// Counts shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DictionaryStats {
    pub countries: usize,
    pub degrees: usize,
    pub majors: usize,
    pub sub_majors: usize,
}

/// Immutable closed vocabularies for country, degree and the major → sub-major hierarchy.
#[derive(Debug, Clone)]
pub struct TagDictionary {
    countries: Vec<String>,
    degrees: Vec<String>,
    majors: Vec<MajorCategory>,
    country_index: HashSet<String>,
    degree_index: HashSet<String>,
    major_index: HashMap<String, usize>,
    /// sub-major name → position of its parent in `majors`
    sub_major_parent: HashMap<String, usize>,
}

impl TagDictionary {
    /// Builds a dictionary, rejecting empty names, duplicates, sub-majors whose parent
    /// is missing, and sub-major names shared by two majors.
    pub fn load(sources: DictionarySources) -> Result<Self, DictionaryError> {
        let countries = clean_names("country", sources.countries)?;
        let degrees = clean_names("degree", sources.degrees)?;
        let major_names = clean_names("major", sources.majors)?;

        let country_index = countries.iter().cloned().collect();
        let degree_index = degrees.iter().cloned().collect();
        let major_index: HashMap<String, usize> = major_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let mut majors: Vec<MajorCategory> = major_names
            .into_iter()
            .map(|name| MajorCategory {
                name,
                sub_majors: Vec::new(),
            })
            .collect();
        let mut sub_major_parent: HashMap<String, usize> = HashMap::new();

        for source in sources.sub_majors {
            let name = clean_name("sub-major", source.name)?;
            let parent = source.parent.trim();
            let parent_pos = *major_index.get(parent).ok_or_else(|| {
                DictionaryError::MissingParent {
                    sub_major: name.clone(),
                    parent: parent.to_string(),
                }
            })?;

            if let Some(&existing) = sub_major_parent.get(&name) {
                if existing == parent_pos {
                    return Err(DictionaryError::DuplicateName {
                        kind: "sub-major",
                        name,
                    });
                }
                return Err(DictionaryError::SubMajorCollision {
                    name,
                    first: majors[existing].name.clone(),
                    second: majors[parent_pos].name.clone(),
                });
            }

            sub_major_parent.insert(name.clone(), parent_pos);
            majors[parent_pos].sub_majors.push(name);
        }

        Ok(Self {
            countries,
            degrees,
            majors,
            country_index,
            degree_index,
            major_index,
            sub_major_parent,
        })
    }

    /// Reads and builds a dictionary from the files in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, DictionaryError> {
        let dictionary = Self::load(DictionarySources::from_dir(dir)?)?;
        info!(dir = %dir.display(), stats = ?dictionary.stats(), "Tag dictionary loaded");
        Ok(dictionary)
    }

    pub fn is_valid_country(&self, name: &str) -> bool {
        self.country_index.contains(name)
    }

    pub fn is_valid_degree(&self, name: &str) -> bool {
        self.degree_index.contains(name)
    }

    pub fn is_valid_major(&self, name: &str) -> bool {
        self.major_index.contains_key(name)
    }

    /// True only if `sub_major` exists and belongs to `major`.
    pub fn is_valid_sub_major(&self, major: &str, sub_major: &str) -> bool {
        match (
            self.major_index.get(major),
            self.sub_major_parent.get(sub_major),
        ) {
            (Some(m), Some(parent)) => m == parent,
            _ => false,
        }
    }

    /// The major category a sub-major belongs to, if any.
    pub fn parent_of(&self, sub_major: &str) -> Option<&str> {
        self.sub_major_parent
            .get(sub_major)
            .map(|&i| self.majors[i].name.as_str())
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn degrees(&self) -> &[String] {
        &self.degrees
    }

    pub fn majors(&self) -> &[MajorCategory] {
        &self.majors
    }

    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            countries: self.countries.len(),
            degrees: self.degrees.len(),
            majors: self.majors.len(),
            sub_majors: self.sub_major_parent.len(),
        }
    }
}

fn clean_name(kind: &'static str, name: String) -> Result<String, DictionaryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DictionaryError::EmptyName { kind });
    }
    Ok(trimmed.to_string())
}

fn clean_names(kind: &'static str, names: Vec<String>) -> Result<Vec<String>, DictionaryError> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut cleaned = Vec::with_capacity(names.len());
    for name in names {
        let name = clean_name(kind, name)?;
        if !seen.insert(name.clone()) {
            return Err(DictionaryError::DuplicateName { kind, name });
        }
        cleaned.push(name);
    }
    Ok(cleaned)
}

// ────────────────────────────────────────────────────────────────────────────
// DictionaryStore
// ────────────────────────────────────────────────────────────────────────────

/// Holds the live dictionary. Readers take a snapshot; reloads swap the whole value.
#[derive(Debug)]
pub struct DictionaryStore {
    current: RwLock<Arc<TagDictionary>>,
}

impl DictionaryStore {
    pub fn new(dictionary: TagDictionary) -> Self {
        Self {
            current: RwLock::new(Arc::new(dictionary)),
        }
    }

    /// The dictionary as of now. Stays valid for the caller even if a reload happens.
    pub fn snapshot(&self) -> Arc<TagDictionary> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `next` and returns the dictionary it replaced.
    pub fn replace(&self, next: Arc<TagDictionary>) -> Arc<TagDictionary> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Loads a fresh dictionary from `dir` and swaps it in. On failure the current
    /// dictionary is left untouched.
    pub fn reload_from(&self, dir: &Path) -> Result<Arc<TagDictionary>, DictionaryError> {
        let fresh = Arc::new(TagDictionary::load_dir(dir)?);
        self.replace(Arc::clone(&fresh));
        Ok(fresh)
    }
}
