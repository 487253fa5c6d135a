/// Set of functions used throughout to assure the correctness of the library.
pub mod assertions;

/// Seeded generation of random instances
pub mod generator;
