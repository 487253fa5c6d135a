//! Identifier synthesis for parameterized heuristics.
//!
//! An identifier is the heuristic's name followed by its tunable parameters,
//! formatted as `name:value` and sorted by name: `BestFit,C:true,FitnessFuncID:0`.
//! Objectives are cached under this string, so two heuristics with equal
//! parameters must produce the same identifier and any parameter change must alter it.

use itertools::Itertools;

/// Canonical textual form of a parameter value inside an identifier
pub trait IdentValue {
    fn write_ident(&self, out: &mut String);
}

macro_rules! ident_value_display {
    ($($t:ty),*) => {
        $(impl IdentValue for $t {
            fn write_ident(&self, out: &mut String) {
                out.push_str(&self.to_string());
            }
        })*
    };
}

ident_value_display!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, bool, String, &str);

impl<T: IdentValue> IdentValue for [T] {
    fn write_ident(&self, out: &mut String) {
        out.push('[');
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            v.write_ident(out);
        }
        out.push(']');
    }
}

impl<T: IdentValue> IdentValue for Vec<T> {
    fn write_ident(&self, out: &mut String) {
        self.as_slice().write_ident(out)
    }
}

/// Builder collecting the included parameters of a heuristic
#[derive(Debug, Clone)]
pub struct Identifier {
    name: String,
    params: Vec<(String, String)>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: vec![],
        }
    }

    /// Includes a parameter under `key` (which may differ from the field's own name).
    pub fn param<V: IdentValue + ?Sized>(mut self, key: &str, value: &V) -> Self {
        let mut formatted = String::new();
        value.write_ident(&mut formatted);
        self.params.push((key.to_string(), formatted));
        self
    }

    /// Includes the parameter only if it is set.
    pub fn opt_param<V: IdentValue>(self, key: &str, value: Option<&V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub fn build(self) -> String {
        let params = self
            .params
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(k, v)| format!("{k}:{v}"));
        std::iter::once(self.name).chain(params).join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_sorted_by_name() {
        let id = Identifier::new("BestFit")
            .param("FitnessFuncID", &0u8)
            .param("C", &true)
            .build();
        assert_eq!(id, "BestFit,C:true,FitnessFuncID:0");
    }

    #[test]
    fn no_params_yields_name() {
        assert_eq!(Identifier::new("FirstFit").build(), "FirstFit");
    }

    #[test]
    fn nested_collections_are_bracketed() {
        let id = Identifier::new("H")
            .param("W", &vec![vec![1u32, 2], vec![3]])
            .build();
        assert_eq!(id, "H,W:[[1,2],[3]]");
    }

    #[test]
    fn optional_params() {
        let unset = Identifier::new("RandomFit").opt_param::<u64>("Seed", None).build();
        let set = Identifier::new("RandomFit").opt_param("Seed", Some(&7u64)).build();
        assert_eq!(unset, "RandomFit");
        assert_eq!(set, "RandomFit,Seed:7");
    }

    #[test]
    fn parameter_change_changes_identifier() {
        let a = Identifier::new("BestFit").param("FitnessFuncID", &0u8).build();
        let b = Identifier::new("BestFit").param("FitnessFuncID", &1u8).build();
        assert_ne!(a, b);
    }
}
