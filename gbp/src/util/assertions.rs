use log::error;

use crate::entities::{BPResult, Instance};

//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks

pub fn instance_shape_correct(instance: &Instance) -> bool {
    instance
        .sizes()
        .iter()
        .all(|row| row.len() == instance.n_bins())
}

/// Checks that every item is assigned to an existing bin and no bin is overloaded
pub fn result_is_feasible(instance: &Instance, result: &BPResult) -> bool {
    if result.item_assignment.len() != instance.n_items()
        || result.bin_enabled.len() != instance.n_bins()
    {
        error!(
            "result shape ({} items, {} bins) does not match instance ({} items, {} bins)",
            result.item_assignment.len(),
            result.bin_enabled.len(),
            instance.n_items(),
            instance.n_bins()
        );
        return false;
    }
    let mut loads = vec![Some(0u64); instance.n_bins()];
    for (item, &bin) in result.item_assignment.iter().enumerate() {
        if bin >= instance.n_bins() {
            error!("item {item} is assigned to non-existing bin {bin}");
            return false;
        }
        loads[bin] = loads[bin].and_then(|l| l.checked_add(instance.size(item, bin)));
    }
    for (bin, load) in loads.iter().enumerate() {
        match load {
            Some(load) if *load <= instance.capacity(bin) => {}
            Some(load) => {
                error!(
                    "bin {bin} is overloaded: {load} > {}",
                    instance.capacity(bin)
                );
                return false;
            }
            None => {
                error!("load of bin {bin} overflows u64");
                return false;
            }
        }
    }
    result.is_consistent()
}
