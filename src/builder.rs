use crate::domain::{
    Experiment, ExperimentDesign, ExperimentRecord, InvestigationMetadata, TechnologyType,
};

/// Pure merge of the catalog record with the three parsed metadata
/// documents. Inputs are already validated by the caller.
pub fn build_experiment(
    record: ExperimentRecord,
    design: ExperimentDesign,
    investigation: InvestigationMetadata,
    technology_type: TechnologyType,
) -> Experiment {
    Experiment {
        accession: record.accession,
        experiment_type: record.experiment_type,
        private: record.private,
        last_update: record.last_update,
        design,
        investigation,
        technology_type,
    }
}
