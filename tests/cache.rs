use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;

use sc_atlas_catalog::cache::ExperimentCache;
use sc_atlas_catalog::domain::{
    Accession, ExperimentDesign, ExperimentRecord, ExperimentType, InvestigationMetadata,
    TechnologyType,
};
use sc_atlas_catalog::error::AtlasError;
use sc_atlas_catalog::sources::{
    DesignParser, InvestigationParser, RecordStore, TechnologyTypeParser,
};

struct StubStore {
    experiment_type: Option<ExperimentType>,
}

impl RecordStore for StubStore {
    fn fetch_record(&self, accession: &Accession) -> Result<Option<ExperimentRecord>, AtlasError> {
        Ok(self.experiment_type.map(|experiment_type| ExperimentRecord {
            accession: accession.clone(),
            experiment_type,
            private: false,
            last_update: "2024-03-01".to_string(),
        }))
    }

    fn fetch_experiment_type(
        &self,
        _accession: &Accession,
    ) -> Result<Option<ExperimentType>, AtlasError> {
        Ok(self.experiment_type)
    }
}

struct CountingDesignParser {
    calls: Arc<Mutex<usize>>,
    delay: Duration,
    failures_before_success: Mutex<usize>,
}

impl CountingDesignParser {
    fn new(delay: Duration, failures_before_success: usize) -> (Self, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let parser = Self {
            calls: Arc::clone(&calls),
            delay,
            failures_before_success: Mutex::new(failures_before_success),
        };
        (parser, calls)
    }
}

impl DesignParser for CountingDesignParser {
    fn parse(&self, _accession: &Accession) -> Result<ExperimentDesign, AtlasError> {
        *self.calls.lock().unwrap() += 1;
        thread::sleep(self.delay);
        let mut failures = self.failures_before_success.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(AtlasError::DesignParse("truncated design file".to_string()));
        }
        Ok(ExperimentDesign {
            assay_headers: vec!["single cell identifier".to_string()],
            sample_count: 42,
        })
    }
}

struct StubInvestigationParser;

impl InvestigationParser for StubInvestigationParser {
    fn parse(&self, accession: &Accession) -> Result<InvestigationMetadata, AtlasError> {
        Ok(InvestigationMetadata {
            title: format!("title of {accession}"),
            description: String::new(),
            pubmed_ids: Vec::new(),
        })
    }
}

struct StubTechnologyParser;

impl TechnologyTypeParser for StubTechnologyParser {
    fn parse(&self, _accession: &Accession) -> Result<TechnologyType, AtlasError> {
        Ok(TechnologyType(vec!["10xV2".to_string()]))
    }
}

type StubCache =
    ExperimentCache<StubStore, CountingDesignParser, StubInvestigationParser, StubTechnologyParser>;

fn cache_with(experiment_type: Option<ExperimentType>, design: CountingDesignParser) -> StubCache {
    ExperimentCache::new(
        StubStore { experiment_type },
        design,
        StubInvestigationParser,
        StubTechnologyParser,
    )
}

fn accession() -> Accession {
    "E-MTAB-5061".parse().unwrap()
}

#[test]
fn concurrent_gets_build_once() {
    let (design, builds) = CountingDesignParser::new(Duration::from_millis(200), 0);
    let cache = Arc::new(cache_with(
        Some(ExperimentType::SingleCellRnaSeqMrnaBaseline),
        design,
    ));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get(&accession())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    // One underlying build, every caller holding the same experiment.
    assert_eq!(*builds.lock().unwrap(), 1);
    let first = &results[0];
    for result in &results {
        assert!(Arc::ptr_eq(first, result));
    }
}

#[test]
fn second_get_reuses_cached_experiment() {
    let (design, builds) = CountingDesignParser::new(Duration::ZERO, 0);
    let cache = cache_with(Some(ExperimentType::SingleNucleusRnaSeqMrnaBaseline), design);

    let first = cache.get(&accession()).unwrap();
    let second = cache.get(&accession()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*builds.lock().unwrap(), 1);
}

#[test]
fn missing_record_is_not_found() {
    let (design, builds) = CountingDesignParser::new(Duration::ZERO, 0);
    let cache = cache_with(None, design);

    let err = cache.get(&accession()).unwrap_err();
    assert_matches!(err, AtlasError::ExperimentNotFound(_));
    assert_eq!(*builds.lock().unwrap(), 0);
}

#[test]
fn bulk_experiment_is_rejected_without_building() {
    let (design, builds) = CountingDesignParser::new(Duration::ZERO, 0);
    let cache = cache_with(Some(ExperimentType::RnaSeqMrnaBaseline), design);

    for _ in 0..2 {
        let err = cache.get(&accession()).unwrap_err();
        assert_matches!(err, AtlasError::UnsupportedExperimentType { .. });
    }
    // No partial experiment was ever assembled or cached.
    assert_eq!(*builds.lock().unwrap(), 0);
}

#[test]
fn failed_build_is_not_poisoned() {
    let (design, builds) = CountingDesignParser::new(Duration::ZERO, 1);
    let cache = cache_with(Some(ExperimentType::SingleCellRnaSeqMrnaBaseline), design);

    let err = cache.get(&accession()).unwrap_err();
    assert_matches!(err, AtlasError::BuildFailure { .. });

    let experiment = cache.get(&accession()).unwrap();
    assert_eq!(experiment.accession, accession());
    assert_eq!(*builds.lock().unwrap(), 2);
}

#[test]
fn waiters_share_the_winning_failure() {
    let (design, builds) = CountingDesignParser::new(Duration::from_millis(200), usize::MAX);
    let cache = Arc::new(cache_with(
        Some(ExperimentType::SingleCellRnaSeqMrnaBaseline),
        design,
    ));
    let workers = 4;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get(&accession())
            })
        })
        .collect();

    for handle in handles {
        let err = handle.join().unwrap().unwrap_err();
        assert_matches!(err, AtlasError::BuildFailure { .. });
    }
    assert_eq!(*builds.lock().unwrap(), 1);
}
