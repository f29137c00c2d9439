use std::fs::File;
use std::io::{
    BufRead,
    BufReader
};
use std::path::Path;

use tracing::debug;

use crate::sample::sampleset::SampleSet;
use crate::simulation::simulationerror::SimulationError;

/// Lines at the top of a track export that carry column titles.
pub const HEADER_LINES: usize = 2;

/// Reads a whitespace separated `t x y` export. Both `,` and `.` are accepted
/// as decimal separator; extra columns after the third are ignored.
pub fn read_track_file<P: AsRef<Path>>(path: P) -> Result<SampleSet, SimulationError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let samples = parse_track(BufReader::new(file))?;
    debug!(path = %path.display(), samples = samples.len(), "imported track file");
    Ok(samples)
}

pub fn parse_track_str(content: &str) -> Result<SampleSet, SimulationError> {
    parse_track(content.as_bytes())
}

pub fn parse_track<R: BufRead>(reader: R) -> Result<SampleSet, SimulationError> {
    let mut t = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();

    for (index, line) in reader.lines().enumerate().skip(HEADER_LINES) {
        let line = line?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let mut next_field = |column: &str| -> Result<f64, SimulationError> {
            let raw = fields.next().ok_or_else(|| {
                SimulationError::invalid_input(format!(
                    "line {}: missing {} column",
                    line_number, column
                ))
            })?;
            parse_number(raw).ok_or_else(|| {
                SimulationError::invalid_input(format!(
                    "line {}: cannot parse {} value '{}'",
                    line_number, column, raw
                ))
            })
        };
        t.push(next_field("t")?);
        x.push(next_field("x")?);
        y.push(next_field("y")?);
    }

    SampleSet::new(t, x, y)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}
