use crate::config::DEFAULT_CATEGORY;
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Fine-grained dump categories and the coarse bucket each one lands in.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("Salud crítica", "Salud"),
    ("Tumores", "Salud"),
    ("Digestivo", "Salud"),
    ("Endocrino", "Salud"),
    ("Cardiovascular", "Salud"),
    ("Respiratorio", "Salud"),
    ("Nervioso", "Salud"),
    ("Renal/urinario", "Salud"),
    ("Reproductor", "Salud"),
    ("Infecciosas", "Salud"),
    ("Piel", "Salud"),
    ("Músculo-esquelético", "Salud"),
    ("Ojos/Oídos", "Salud"),
    ("Dolor/Inflamación", "Salud"),
    ("Inmunidad", "Salud"),
    ("Emocional/Mental", "Crecimiento personal"),
    ("Energía/Vitalidad", "Energía y vitalidad"),
    ("Otros", "Otros"),
];

/// On-disk shape of a taxonomy file. `BTreeMap` keeps the JSON stable for diffs.
#[derive(Serialize, Deserialize)]
struct TaxonomyFile {
    default: String,
    mappings: BTreeMap<String, String>,
}

/// Immutable fine-to-coarse category lookup with a catch-all bucket.
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    mappings: FxHashMap<String, String>,
    default: String,
}

impl CategoryTaxonomy {
    pub fn new<I, K, V>(mappings: I, default: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if default.trim().is_empty() {
            bail!("Default category must not be empty");
        }

        let mut map = FxHashMap::default();
        for (fine, coarse) in mappings {
            let fine: String = fine.into();
            let coarse: String = coarse.into();
            if coarse.trim().is_empty() {
                bail!("Category {:?} maps to an empty coarse label", fine);
            }
            map.insert(fine, coarse);
        }

        Ok(Self {
            mappings: map,
            default: default.to_string(),
        })
    }

    /// The taxonomy shipped with the tool, used when no file is supplied.
    pub fn builtin() -> Self {
        Self {
            mappings: BUILTIN_MAPPINGS
                .iter()
                .map(|(fine, coarse)| (fine.to_string(), coarse.to_string()))
                .collect(),
            default: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open taxonomy file: {:?}", path))?;
        let parsed: TaxonomyFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse taxonomy file: {:?}", path))?;

        let taxonomy = Self::new(parsed.mappings, &parsed.default)
            .with_context(|| format!("Invalid taxonomy file: {:?}", path))?;

        info!(
            mappings = taxonomy.len(),
            default = taxonomy.default_label(),
            path = ?path,
            "Taxonomy loaded"
        );
        Ok(taxonomy)
    }

    /// Writes the taxonomy as pretty JSON, the same shape [`CategoryTaxonomy::load`] reads.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let file = TaxonomyFile {
            default: self.default.clone(),
            mappings: self
                .mappings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, &file).context("Failed to serialize taxonomy")?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Coarse label for `fine`; unknown labels (including `""`) get the default.
    pub fn normalize(&self, fine: &str) -> &str {
        match self.mappings.get(fine) {
            Some(coarse) => coarse.as_str(),
            None => {
                debug!(category = fine, default = %self.default, "Unknown category");
                self.default.as_str()
            }
        }
    }

    pub fn is_known(&self, fine: &str) -> bool {
        self.mappings.contains_key(fine)
    }

    pub fn default_label(&self) -> &str {
        &self.default
    }

    /// Every label `normalize` can return, sorted and deduplicated.
    pub fn output_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .mappings
            .values()
            .map(String::as_str)
            .chain(std::iter::once(self.default.as_str()))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}
