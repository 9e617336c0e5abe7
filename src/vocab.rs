//! Label vocabulary loading.
//!
//! The converters never discover a vocabulary themselves; callers load one
//! here and pass it in. Two on-disk shapes are supported: a plain
//! `classes.txt` with one class name per line, and an Ultralytics-style
//! `data.yaml` whose `names:` key is either a sequence or an index mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConvertError;

/// An ordered list of class names, index position = class id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    /// Wraps an already-ordered list of class names.
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a vocabulary file, dispatching on extension: `.yaml`/`.yml` is
    /// read as a `data.yaml` `names:` block, anything else as one name per
    /// line.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::load_data_yaml(path)
        } else {
            Self::load_classes_txt(path)
        }
    }

    /// Index-to-name view for the TXT reader.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name-to-index view for the TXT writer. The first occurrence of a
    /// duplicated name wins.
    pub fn index_map(&self) -> BTreeMap<String, u32> {
        let mut map = BTreeMap::new();
        for (index, name) in self.names.iter().enumerate() {
            map.entry(name.clone()).or_insert(index as u32);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn load_classes_txt(path: &Path) -> Result<Self, ConvertError> {
        let data = fs::read_to_string(path).map_err(ConvertError::Io)?;
        let mut names = Vec::new();

        for (line_idx, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Err(ConvertError::VocabInvalid {
                    path: path.to_path_buf(),
                    message: format!("line {} is empty", line_idx + 1),
                });
            }
            names.push(trimmed.to_string());
        }

        Ok(Self { names })
    }

    fn load_data_yaml(path: &Path) -> Result<Self, ConvertError> {
        let data = fs::read_to_string(path).map_err(ConvertError::Io)?;
        let parsed: DataYaml =
            serde_yaml::from_str(&data).map_err(|source| ConvertError::VocabParse {
                path: path.to_path_buf(),
                source,
            })?;

        let names = match parsed.names {
            DataYamlNames::Sequence(names) => names,
            DataYamlNames::Mapping(mapping) => {
                if mapping.is_empty() {
                    Vec::new()
                } else {
                    let max_index = *mapping.keys().max().expect("checked non-empty");
                    let mut names = vec![String::new(); max_index + 1];
                    for (index, name) in mapping {
                        names[index] = name;
                    }
                    // Gaps in the index mapping get placeholder names so that
                    // positions stay aligned with class ids.
                    for (index, name) in names.iter_mut().enumerate() {
                        if name.trim().is_empty() {
                            *name = format!("class_{}", index);
                        }
                    }
                    names
                }
            }
        };

        Ok(Self { names })
    }
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}
