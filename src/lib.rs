pub use ::sluice_core::*;
pub use ::sluice_macros::*;
