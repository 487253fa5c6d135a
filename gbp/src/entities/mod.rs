mod instance;
mod solution;

#[doc(inline)]
pub use instance::Instance;
#[doc(inline)]
pub use solution::BPResult;
