//! Problem model for the generalized bin packing problem (GBPP).
//!
//! Bins are heterogeneous and the size an item occupies depends on the bin it is
//! assigned to. The objective is the number of bins in use.

/// Entities modelling the problem: instances and results
pub mod entities;

/// Importing instances from, and exporting them to, the supported textual formats
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;

/// Number of bins used by an assignment, the only value tracked by the evaluation pipeline
pub type Objective = u64;
