use anyhow::{Context, Result};

use crate::entities::{BPResult, Instance};
use crate::io::ext_repr::{ExtInstance, ExtResult};

pub fn decode(text: &str) -> Result<Instance> {
    let ext_instance: ExtInstance =
        serde_json::from_str(text).context("incorrect json instance format")?;
    import(ext_instance)
}

pub fn encode(instance: &Instance) -> String {
    let ext_instance = export(instance);
    serde_json::to_string_pretty(&ext_instance).expect("instance should always serialize")
}

/// Imports an instance into the library
pub fn import(ext_instance: ExtInstance) -> Result<Instance> {
    Instance::new(ext_instance.capacities, ext_instance.sizes)
}

/// Exports an instance out of the library
pub fn export(instance: &Instance) -> ExtInstance {
    ExtInstance {
        capacities: instance.capacities().to_vec(),
        sizes: instance.sizes().to_vec(),
    }
}

pub fn export_result(result: &BPResult) -> ExtResult {
    ExtResult {
        bins_used: result.bins_used,
        bin_enabled: result.bin_enabled.clone(),
        item_assignment: result.item_assignment.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_document() {
        let instance = decode(r#"{"capacities": [3, 4], "sizes": [[1, 2]]}"#).unwrap();
        assert_eq!(instance.capacities(), &[3, 4]);
        assert_eq!(instance.size(0, 1), 2);
    }

    #[test]
    fn rejects_missing_field() {
        assert!(decode(r#"{"capacities": [3, 4]}"#).is_err());
    }
}
