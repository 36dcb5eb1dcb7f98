use std::io::BufRead;

use anyhow::{bail, Context as _};

/// A single observation read from the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Coordinate of the observation.
    pub coord: f64,

    /// Values attached to the observation. May be empty.
    pub values: Vec<f64>,
}

/// Parses a single input line.
///
/// Returns `None` for empty lines and comments.
///
/// # Errors
///
/// If a field is not a number, or the line holds more than three fields, an error is returned.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Observation>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace().map(|field| {
        field
            .parse::<f64>()
            .with_context(|| format!("'{}' is not a number", field))
    });

    let coord = match fields.next() {
        Some(coord) => coord?,
        None => return Ok(None),
    };
    let values = fields.collect::<anyhow::Result<Vec<_>>>()?;
    if values.len() > 2 {
        bail!("expected at most two values after the coordinate, found {}", values.len());
    }

    Ok(Some(Observation { coord, values }))
}

/// Reads every observation from `reader`, calling `f` on each in order.
///
/// # Errors
///
/// If reading fails, a line cannot be parsed, or `f` returns an error, the error is returned along with the offending
/// line number.
pub fn for_each_observation<R, F>(reader: R, mut f: F) -> anyhow::Result<usize>
where
    R: BufRead,
    F: FnMut(Observation) -> anyhow::Result<()>,
{
    let mut observations = 0;
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}.", number + 1))?;
        if let Some(observation) = parse_line(&line).with_context(|| format!("Invalid input on line {}.", number + 1))? {
            f(observation)?;
            observations += 1;
        }
    }
    Ok(observations)
}
