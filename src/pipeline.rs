use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::aggregator::IdentifierStageAggregator;
use crate::domain::IdentifierSet;
use crate::error::AtlasError;
use crate::index::{IndexClient, MAX_RESULT_ROWS};
use crate::sampler::RandomSampler;

pub const GENE_ID_FIELD: &str = "gene_id";
pub const CELL_ID_FIELD: &str = "cell_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchAttribute {
    CellType,
    OrganismPart,
}

impl SearchAttribute {
    pub fn value_field(self) -> &'static str {
        match self {
            SearchAttribute::CellType => "cell_type",
            SearchAttribute::OrganismPart => "organism_part",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchAttributeSets {
    pub cell_types: IdentifierSet,
    pub organism_parts: IdentifierSet,
}

/// Staged gene → cell → attribute narrowing with bounded random sampling
/// of the final value list. Every stage checks its input for emptiness
/// before issuing work.
pub struct SearchAggregationPipeline<'a, C: IndexClient + ?Sized> {
    index: &'a C,
    sample_size: usize,
    sampler: RandomSampler,
}

impl<'a, C: IndexClient + ?Sized> SearchAggregationPipeline<'a, C> {
    pub fn new(index: &'a C, sample_size: usize) -> Self {
        Self {
            index,
            sample_size,
            // The bounded result list is routinely smaller than the
            // requested sample, so the pipeline opts into undersampling.
            sampler: RandomSampler::allowing_undersample(),
        }
    }

    pub fn search(
        &self,
        gene_ids: &IdentifierSet,
        attribute: SearchAttribute,
    ) -> Result<IdentifierSet, AtlasError> {
        let gene_stage = IdentifierStageAggregator::new(
            self.index,
            GENE_ID_FIELD,
            CELL_ID_FIELD,
            MAX_RESULT_ROWS,
        );
        let cell_ids = gene_stage.narrow(gene_ids)?;
        debug!(genes = gene_ids.len(), cells = cell_ids.len(), "gene stage");
        if cell_ids.is_empty() {
            return Ok(IdentifierSet::new());
        }

        let attribute_stage = IdentifierStageAggregator::new(
            self.index,
            CELL_ID_FIELD,
            attribute.value_field(),
            MAX_RESULT_ROWS,
        );
        let values = attribute_stage.narrow_values(&cell_ids)?;
        debug!(values = values.len(), field = attribute.value_field(), "attribute stage");
        if values.is_empty() {
            return Ok(IdentifierSet::new());
        }

        let indices = self.sampler.sample(values.len(), self.sample_size)?;
        Ok(indices.into_iter().map(|index| values[index].clone()).collect())
    }

    /// The two attribute instances of the pipeline; each short-circuits
    /// independently and neither orders before the other.
    pub fn search_attributes(
        &self,
        gene_ids: &IdentifierSet,
    ) -> Result<SearchAttributeSets, AtlasError> {
        Ok(SearchAttributeSets {
            cell_types: self.search(gene_ids, SearchAttribute::CellType)?,
            organism_parts: self.search(gene_ids, SearchAttribute::OrganismPart)?,
        })
    }
}
