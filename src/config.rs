//! Loader configuration: section markers and the malformed-row policy.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Marker lines that open each section of a cohort file.
///
/// Can be stored as a JSON object on disk; missing keys keep their defaults:
/// ```json
/// {
///   "students": "ETUDIANTS",
///   "courses": "MATIERES",
///   "grades": "NOTES"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SectionNames {
    pub students: String,
    pub courses: String,
    pub grades: String,
}

impl Default for SectionNames {
    fn default() -> Self {
        Self {
            students: "ETUDIANTS".to_string(),
            courses: "MATIERES".to_string(),
            grades: "NOTES".to_string(),
        }
    }
}

impl SectionNames {
    /// Loads the markers from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read section config {path}"))?;
        let names = serde_json::from_str(&content)
            .with_context(|| format!("invalid section config {path}"))?;
        Ok(names)
    }
}

/// What the loader does with a row that fails strict parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Keep the row, reading unparseable numbers as zero.
    #[default]
    Lenient,
    /// Drop the row.
    Skip,
    /// Abort the load.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub sections: SectionNames,
    pub policy: ParsePolicy,
}
