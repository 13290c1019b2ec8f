mod as_value;
mod builder_data;
mod builders;
mod command;
mod config;
mod connection;
mod context;
mod db_type;
mod driver;
mod entity;
mod error;
mod events;
mod mapper;
mod parameter;
mod provider;
mod row;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use builder_data::*;
pub use builders::*;
pub use command::*;
pub use config::*;
pub use connection::*;
pub use context::*;
pub use db_type::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use events::*;
pub use mapper::*;
pub use parameter::*;
pub use provider::*;
pub use row::*;
pub use statement::*;
pub use util::*;
pub use value::*;
