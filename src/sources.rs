use crate::domain::{
    Accession, ExperimentDesign, ExperimentRecord, ExperimentType, InvestigationMetadata,
    TechnologyType,
};
use crate::error::AtlasError;

pub trait RecordStore: Send + Sync {
    fn fetch_record(&self, accession: &Accession) -> Result<Option<ExperimentRecord>, AtlasError>;
    fn fetch_experiment_type(
        &self,
        accession: &Accession,
    ) -> Result<Option<ExperimentType>, AtlasError>;
}

pub trait DesignParser: Send + Sync {
    fn parse(&self, accession: &Accession) -> Result<ExperimentDesign, AtlasError>;
}

pub trait InvestigationParser: Send + Sync {
    fn parse(&self, accession: &Accession) -> Result<InvestigationMetadata, AtlasError>;
}

pub trait TechnologyTypeParser: Send + Sync {
    fn parse(&self, accession: &Accession) -> Result<TechnologyType, AtlasError>;
}
