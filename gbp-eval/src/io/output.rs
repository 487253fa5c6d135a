use gbp::io::ext_repr::{ExtInstance, ExtResult};
use serde::{Deserialize, Serialize};

/// Result of the `solve` command: the instance, the assignment and who produced it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SolveOutput {
    #[serde(flatten)]
    pub instance: ExtInstance,
    pub result: ExtResult,
    pub heuristic: String,
}

#[cfg(test)]
mod tests {
    use gbp::entities::Instance;
    use gbp::io::json;
    use gbp_heur::Heuristic;
    use gbp_heur::opt::first_fit::FirstFit;
    use gbp_heur::opt::never_cancelled;

    use super::*;

    #[test]
    fn instance_fields_are_flattened() {
        let instance = Instance::new(vec![14, 15], vec![vec![6, 3], vec![7, 8]]).unwrap();
        let result = FirstFit::new().optimize(&instance, &never_cancelled).unwrap();
        let output = SolveOutput {
            instance: json::export(&instance),
            result: json::export_result(&result),
            heuristic: "FirstFit".to_string(),
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["capacities"], serde_json::json!([14, 15]));
        assert_eq!(value["result"]["bins_used"], serde_json::json!(1));
        assert_eq!(value["result"]["item_assignment"], serde_json::json!([0, 0]));

        let back: SolveOutput = serde_json::from_value(value).unwrap();
        assert_eq!(back, output);
    }
}
