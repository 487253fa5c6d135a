//! Parser for the solution block printed by the reference solver.
//!
//! The solver prints arbitrary text interleaved with `KEY = value` lines, for example:
//! ```text
//! // solution (optimal) with objective 2
//! N = 4;
//! V = 2;
//! RRH_COUNT = 2;
//! RRH_ENABLE = [1 1 0 0];
//! VEHICLE_ASSIGNMENT = [0 1];
//! ```
//! Array values are bracketed, whitespace separated and may span several lines.

use gbp::Objective;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OplrunOutput {
    pub n: Option<u64>,
    pub v: Option<u64>,
    pub rrh_count: Option<u64>,
    pub rrh_enable: Option<Vec<u64>>,
    pub vehicle_assignment: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    N,
    V,
    RrhCount,
    RrhEnable,
    VehicleAssignment,
}

impl Key {
    fn from_str(key: &str) -> Option<Self> {
        match key {
            "N" => Some(Key::N),
            "V" => Some(Key::V),
            "RRH_COUNT" => Some(Key::RrhCount),
            "RRH_ENABLE" => Some(Key::RrhEnable),
            "VEHICLE_ASSIGNMENT" => Some(Key::VehicleAssignment),
            _ => None,
        }
    }
}

impl OplrunOutput {
    /// Parses the full standard output of the solver.
    /// Unknown keys and free text are skipped, a known key with a malformed value is an error.
    pub fn parse(output: &str) -> Result<Self, String> {
        let mut parsed = OplrunOutput::default();
        let mut lines = output.lines();

        while let Some(line) = lines.next() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let Some(key) = Key::from_str(key.trim()) else {
                continue;
            };
            let mut value = value.trim().to_string();

            if value.starts_with('[') {
                //accumulate until the closing bracket
                while !value.contains(']') {
                    match lines.next() {
                        Some(next) => {
                            value.push(' ');
                            value.push_str(next.trim());
                        }
                        None => return Err(format!("unterminated array for key {key:?}")),
                    }
                }
            }
            let value = value.trim_end_matches(';').trim();

            match key {
                Key::N => parsed.n = Some(parse_scalar(key, value)?),
                Key::V => parsed.v = Some(parse_scalar(key, value)?),
                Key::RrhCount => parsed.rrh_count = Some(parse_scalar(key, value)?),
                Key::RrhEnable => parsed.rrh_enable = Some(parse_array(key, value)?),
                Key::VehicleAssignment => {
                    parsed.vehicle_assignment = Some(parse_array(key, value)?)
                }
            }
        }
        Ok(parsed)
    }

    /// Number of bins in use, the only value the pipeline consumes.
    pub fn objective(&self) -> Result<Objective, String> {
        self.rrh_count
            .ok_or_else(|| "missing RRH_COUNT in solver output".to_string())
    }
}

fn parse_scalar(key: Key, value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("non-integer value for {key:?}: {value:?}"))
}

fn parse_array(key: Key, value: &str) -> Result<Vec<u64>, String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| format!("expected bracketed array for {key:?}: {value:?}"))?;
    inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| parse_scalar(key, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
<<< setup

<<< solve

OBJECTIVE: 2
N = 4;
V = 2;
RRH_COUNT = 2;
RRH_ENABLE = [1 1 0 0];
VEHICLE_ASSIGNMENT = [0
         1];
SOMETHING_ELSE = banana;

<<< post process
";

    #[test]
    fn parses_full_block() {
        let out = OplrunOutput::parse(SAMPLE).unwrap();
        assert_eq!(out.n, Some(4));
        assert_eq!(out.v, Some(2));
        assert_eq!(out.objective(), Ok(2));
        assert_eq!(out.rrh_enable, Some(vec![1, 1, 0, 0]));
        assert_eq!(out.vehicle_assignment, Some(vec![0, 1]));
    }

    #[test]
    fn missing_count_is_reported_by_objective() {
        let out = OplrunOutput::parse("no solution\nN = 3\n").unwrap();
        assert_eq!(out.n, Some(3));
        assert!(out.objective().is_err());
    }

    #[test]
    fn non_integer_count_fails() {
        assert!(OplrunOutput::parse("RRH_COUNT = two;\n").is_err());
    }

    #[test]
    fn unterminated_array_fails() {
        assert!(OplrunOutput::parse("RRH_ENABLE = [1 0\n1\n").is_err());
    }

    #[test]
    fn empty_output_parses_to_nothing() {
        assert_eq!(OplrunOutput::parse("").unwrap(), OplrunOutput::default());
    }
}
