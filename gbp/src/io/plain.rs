//! Plain format: `N V` on the first line, the `N` capacities on the second,
//! followed by one line of `N` sizes per item. Any whitespace separates values.

use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;

use crate::entities::Instance;

pub fn decode(text: &str) -> Result<Instance> {
    let mut tokens = text.split_whitespace().enumerate().map(|(idx, tok)| {
        tok.parse::<u64>()
            .with_context(|| format!("token {idx} ({tok:?}) is not a non-negative integer"))
    });
    let mut next = |what: &str| -> Result<u64> {
        match tokens.next() {
            Some(value) => value,
            None => bail!("unexpected end of input while reading {what}"),
        }
    };

    let n = next("N")? as usize;
    let v = next("V")? as usize;
    let capacities = (0..n)
        .map(|j| next(&format!("capacity of bin {j}")))
        .collect::<Result<Vec<_>>>()?;
    let sizes = (0..v)
        .map(|i| {
            (0..n)
                .map(|j| next(&format!("size of item {i} in bin {j}")))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    ensure!(
        tokens.next().is_none(),
        "trailing values after {v} rows of {n} sizes"
    );
    Instance::new(capacities, sizes)
}

pub fn encode(instance: &Instance) -> String {
    let mut out = format!("{} {}\n", instance.n_bins(), instance.n_items());
    out.push_str(&instance.capacities().iter().join(" "));
    out.push('\n');
    for row in instance.sizes() {
        out.push_str(&row.iter().join(" "));
        out.push('\n');
    }
    out
}
