use std::io::{self, Write};

use serde::Serialize;

use crate::domain::IdentifierSet;
use crate::harness::BatchOutcome;
use crate::pipeline::SearchAttributeSets;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_batch(outcome: &BatchOutcome) -> io::Result<()> {
        Self::print_json(outcome)
    }

    pub fn print_search(result: &SearchAttributeSets) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_value_set(values: &IdentifierSet) -> io::Result<()> {
        Self::print_json(values)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
