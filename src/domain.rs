use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// Set of string identifiers (gene ids, cell ids, attribute values).
/// Duplicates collapse; the empty set is a meaningful terminal value.
pub type IdentifierSet = BTreeSet<String>;

static ACCESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^E-[A-Z]{3,5}-\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accession(String);

impl Accession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Accession {
    type Err = AtlasError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !ACCESSION_RE.is_match(&normalized) {
            return Err(AtlasError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentType {
    SingleCellRnaSeqMrnaBaseline,
    SingleNucleusRnaSeqMrnaBaseline,
    RnaSeqMrnaBaseline,
    MicroarrayMrna,
}

impl ExperimentType {
    pub fn is_single_cell(self) -> bool {
        matches!(
            self,
            ExperimentType::SingleCellRnaSeqMrnaBaseline
                | ExperimentType::SingleNucleusRnaSeqMrnaBaseline
        )
    }

    pub fn tag(self) -> &'static str {
        match self {
            ExperimentType::SingleCellRnaSeqMrnaBaseline => "SINGLE_CELL_RNASEQ_MRNA_BASELINE",
            ExperimentType::SingleNucleusRnaSeqMrnaBaseline => {
                "SINGLE_NUCLEUS_RNASEQ_MRNA_BASELINE"
            }
            ExperimentType::RnaSeqMrnaBaseline => "RNASEQ_MRNA_BASELINE",
            ExperimentType::MicroarrayMrna => "MICROARRAY_1COLOUR_MRNA_DIFFERENTIAL",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ExperimentType {
    type Err = AtlasError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "SINGLE_CELL_RNASEQ_MRNA_BASELINE" => Ok(ExperimentType::SingleCellRnaSeqMrnaBaseline),
            "SINGLE_NUCLEUS_RNASEQ_MRNA_BASELINE" => {
                Ok(ExperimentType::SingleNucleusRnaSeqMrnaBaseline)
            }
            "RNASEQ_MRNA_BASELINE" => Ok(ExperimentType::RnaSeqMrnaBaseline),
            "MICROARRAY_1COLOUR_MRNA_DIFFERENTIAL" => Ok(ExperimentType::MicroarrayMrna),
            _ => Err(AtlasError::InvalidExperimentType(value.to_string())),
        }
    }
}

/// Raw catalog row for one experiment, read-only input to the cache build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub accession: Accession,
    pub experiment_type: ExperimentType,
    pub private: bool,
    pub last_update: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentDesign {
    pub assay_headers: Vec<String>,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationMetadata {
    pub title: String,
    pub description: String,
    pub pubmed_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyType(pub Vec<String>);

/// Immutable domain experiment, merged once at build time and shared
/// read-only through the cache.
#[derive(Debug, Clone, Serialize)]
pub struct Experiment {
    pub accession: Accession,
    pub experiment_type: ExperimentType,
    pub private: bool,
    pub last_update: String,
    pub design: ExperimentDesign,
    pub investigation: InvestigationMetadata,
    pub technology_type: TechnologyType,
}
