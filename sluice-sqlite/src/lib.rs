mod connection;
mod convert;
mod driver;

pub use connection::*;
pub use driver::*;
