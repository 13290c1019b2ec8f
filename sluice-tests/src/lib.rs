mod builders;
mod capabilities;
mod catalog;
mod events;
mod mapping;
#[cfg(not(feature = "disable-multiple-resultsets"))]
mod multiple;
mod simple;
#[cfg(not(feature = "disable-transactions"))]
mod transactions;

use builders::builders;
use capabilities::capabilities;
use events::events;
use log::LevelFilter;
use mapping::mapping;
#[cfg(not(feature = "disable-multiple-resultsets"))]
use multiple::multiple;
use simple::simple;
use sluice::DbContext;
use std::env;
#[cfg(not(feature = "disable-transactions"))]
use transactions::transactions;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite, `factory` returns a new unit of work on the database under test.
pub fn execute_tests(factory: impl Fn() -> DbContext) {
    simple(&factory);
    mapping(&factory);
    builders(&factory);
    #[cfg(not(feature = "disable-multiple-resultsets"))]
    multiple(&factory);
    #[cfg(not(feature = "disable-transactions"))]
    transactions(&factory);
    events(&factory);
    capabilities(&factory);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
