use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::entities::Instance;

/// OPL data files (`.dat`), the format consumed by the reference solver
pub mod cplex;
/// External (serializable) representations of the problem entities
pub mod ext_repr;
/// JSON instances
pub mod json;
/// Whitespace separated integers
pub mod plain;

/// The textual instance formats understood by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Plain,
    Cplex,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Plain, Format::Cplex];

    /// Guesses the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("txt") => Ok(Format::Plain),
            Some("dat") => Ok(Format::Cplex),
            ext => bail!(
                "cannot determine instance format of {} (extension: {:?})",
                path.display(),
                ext
            ),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Plain => "txt",
            Format::Cplex => "dat",
        }
    }

    pub fn decode(&self, text: &str) -> Result<Instance> {
        match self {
            Format::Json => json::decode(text),
            Format::Plain => plain::decode(text),
            Format::Cplex => cplex::decode(text),
        }
    }

    pub fn encode(&self, instance: &Instance) -> String {
        match self {
            Format::Json => json::encode(instance),
            Format::Plain => plain::encode(instance),
            Format::Cplex => cplex::encode(instance),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Plain => "plain",
            Format::Cplex => "cplex",
        };
        f.write_str(name)
    }
}

pub fn read_instance(path: &Path, format: Format) -> Result<Instance> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read instance file: {}", path.display()))?;
    format
        .decode(&text)
        .with_context(|| format!("could not parse {format} instance: {}", path.display()))
}

pub fn write_instance(instance: &Instance, path: &Path, format: Format) -> Result<()> {
    fs::write(path, format.encode(instance))
        .with_context(|| format!("could not write instance file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn example() -> Instance {
        Instance::new(
            vec![14, 15, 8, 10],
            vec![vec![6, 3, 2, 1], vec![7, 8, 5, 3]],
        )
        .unwrap()
    }

    #[test_case(Format::Json; "json")]
    #[test_case(Format::Plain; "plain")]
    #[test_case(Format::Cplex; "cplex")]
    fn decode_inverts_encode(format: Format) {
        let instance = example();
        let text = format.encode(&instance);
        assert_eq!(format.decode(&text).unwrap(), instance);
    }

    #[test_case(Format::Json; "json")]
    #[test_case(Format::Plain; "plain")]
    #[test_case(Format::Cplex; "cplex")]
    fn instance_without_items(format: Format) {
        let instance = Instance::new(vec![5, 6], vec![]).unwrap();
        assert_eq!(format.decode(&format.encode(&instance)).unwrap(), instance);
    }

    #[test_case("a.json", Some(Format::Json))]
    #[test_case("dir/b.txt", Some(Format::Plain))]
    #[test_case("c.dat", Some(Format::Cplex))]
    #[test_case("d.mod", None)]
    fn format_from_extension(path: &str, expected: Option<Format>) {
        assert_eq!(Format::from_path(Path::new(path)).ok(), expected);
    }
}
