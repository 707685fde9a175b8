use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::builder::build_experiment;
use crate::domain::{Accession, Experiment};
use crate::error::AtlasError;
use crate::sources::{DesignParser, InvestigationParser, RecordStore, TechnologyTypeParser};

type BuildResult = Result<Arc<Experiment>, AtlasError>;

struct InflightBuild {
    outcome: Mutex<Option<BuildResult>>,
    cv: Condvar,
}

impl InflightBuild {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    fn wait(&self) -> BuildResult {
        let mut guard = self.outcome.lock();
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            self.cv.wait(&mut guard);
        }
    }

    fn complete(&self, result: BuildResult) {
        *self.outcome.lock() = Some(result);
        self.cv.notify_all();
    }
}

enum Slot {
    Ready(Arc<Experiment>),
    Building(Arc<InflightBuild>),
}

enum Role {
    Leader(Arc<InflightBuild>),
    Waiter(Arc<InflightBuild>),
}

/// Keyed single-flight cache in front of the experiment build.
///
/// For any accession at most one build runs at a time; concurrent callers
/// for the same key wait on the in-flight build and share its outcome.
/// Successful builds stay cached; failed builds clear the slot so a later
/// call may retry.
pub struct ExperimentCache<S, D, I, T> {
    store: S,
    design: D,
    investigation: I,
    technology: T,
    entries: Mutex<HashMap<Accession, Slot>>,
}

impl<S, D, I, T> ExperimentCache<S, D, I, T>
where
    S: RecordStore,
    D: DesignParser,
    I: InvestigationParser,
    T: TechnologyTypeParser,
{
    pub fn new(store: S, design: D, investigation: I, technology: T) -> Self {
        Self {
            store,
            design,
            investigation,
            technology,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, accession: &Accession) -> BuildResult {
        let role = {
            let mut entries = self.entries.lock();
            match entries.get(accession) {
                Some(Slot::Ready(experiment)) => return Ok(Arc::clone(experiment)),
                Some(Slot::Building(build)) => Role::Waiter(Arc::clone(build)),
                None => {
                    let build = Arc::new(InflightBuild::new());
                    entries.insert(accession.clone(), Slot::Building(Arc::clone(&build)));
                    Role::Leader(build)
                }
            }
        };

        match role {
            Role::Waiter(build) => build.wait(),
            Role::Leader(build) => {
                let result = self.build(accession).map(Arc::new);
                {
                    // Only the leader touches this key while the build slot
                    // is occupied; waiters never mutate the map.
                    let mut entries = self.entries.lock();
                    match &result {
                        Ok(experiment) => {
                            entries
                                .insert(accession.clone(), Slot::Ready(Arc::clone(experiment)));
                        }
                        Err(_) => {
                            entries.remove(accession);
                        }
                    }
                }
                build.complete(result.clone());
                result
            }
        }
    }

    fn build(&self, accession: &Accession) -> Result<Experiment, AtlasError> {
        debug!(accession = %accession, "building experiment");

        let experiment_type = self
            .store
            .fetch_experiment_type(accession)?
            .ok_or_else(|| AtlasError::ExperimentNotFound(accession.to_string()))?;
        if !experiment_type.is_single_cell() {
            return Err(AtlasError::UnsupportedExperimentType {
                accession: accession.to_string(),
                experiment_type: experiment_type.to_string(),
            });
        }

        let record = self
            .store
            .fetch_record(accession)?
            .ok_or_else(|| AtlasError::ExperimentNotFound(accession.to_string()))?;

        let wrap = |err: AtlasError| AtlasError::BuildFailure {
            accession: accession.to_string(),
            message: err.to_string(),
        };
        let design = self.design.parse(accession).map_err(wrap)?;
        let investigation = self.investigation.parse(accession).map_err(wrap)?;
        let technology_type = self.technology.parse(accession).map_err(wrap)?;

        debug!(accession = %accession, "experiment built");
        Ok(build_experiment(record, design, investigation, technology_type))
    }
}
