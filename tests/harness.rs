use std::collections::HashSet;
use std::fs;

use camino::Utf8PathBuf;

use sc_atlas_catalog::domain::Accession;
use sc_atlas_catalog::error::AtlasError;
use sc_atlas_catalog::harness::{BatchIngestionHarness, parse_accession_list};

fn accessions(raw: &[&str]) -> Vec<Accession> {
    raw.iter().map(|acc| acc.parse().unwrap()).collect()
}

#[test]
fn retry_file_round_trips_failed_accessions() {
    let temp = tempfile::tempdir().unwrap();
    let retry_path = Utf8PathBuf::from_path_buf(temp.path().join("failed.txt")).unwrap();

    let batch = accessions(&["E-MTAB-1", "E-GEOD-2", "E-MTAB-3", "E-HCAD-4"]);
    let harness = BatchIngestionHarness::with_retry_file(retry_path.clone());
    let outcome = harness
        .run(&batch, |accession| {
            if accession.as_str().starts_with("E-MTAB") {
                Err(AtlasError::RecordStore("connection reset".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap();

    assert_eq!(outcome.exit_code(), 1);
    let written = fs::read_to_string(retry_path.as_std_path()).unwrap();
    let reloaded = parse_accession_list(&written).unwrap();
    assert_eq!(reloaded, outcome.failed_accessions());
    assert_eq!(reloaded, accessions(&["E-MTAB-1", "E-MTAB-3"]));
}

#[test]
fn clean_run_writes_no_retry_file() {
    let temp = tempfile::tempdir().unwrap();
    let retry_path = Utf8PathBuf::from_path_buf(temp.path().join("failed.txt")).unwrap();

    let batch = accessions(&["E-MTAB-1", "E-GEOD-2"]);
    let outcome = BatchIngestionHarness::with_retry_file(retry_path.clone())
        .run(&batch, |_| Ok(()))
        .unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert!(!retry_path.as_std_path().exists());
}

#[test]
fn private_flag_reaches_the_unit_of_work() {
    let batch = accessions(&["E-MTAB-1", "E-GEOD-2", "E-MTAB-3"]);
    let private: HashSet<Accession> = accessions(&["E-GEOD-2"]).into_iter().collect();
    let mut seen = Vec::new();

    let outcome = BatchIngestionHarness::new()
        .run(&batch, |accession| {
            seen.push((accession.clone(), private.contains(accession)));
            Ok(())
        })
        .unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        seen.iter()
            .filter(|(_, is_private)| *is_private)
            .map(|(accession, _)| accession.clone())
            .collect::<Vec<_>>(),
        accessions(&["E-GEOD-2"])
    );
}

#[test]
fn every_item_runs_even_when_earlier_ones_fail() {
    let batch = accessions(&["E-MTAB-1", "E-MTAB-2", "E-MTAB-3"]);
    let mut attempts = 0;

    let outcome = BatchIngestionHarness::new()
        .run(&batch, |accession| {
            attempts += 1;
            if accession.as_str() == "E-MTAB-2" {
                Err(AtlasError::DesignParse("bad column header".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap();

    assert_eq!(attempts, 3);
    assert_eq!(outcome.failed_accessions(), accessions(&["E-MTAB-2"]));
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn timestamps_are_ordered() {
    let outcome = BatchIngestionHarness::new()
        .run(&accessions(&["E-MTAB-1"]), |_| Ok(()))
        .unwrap();
    assert!(outcome.started_at <= outcome.finished_at);
}
