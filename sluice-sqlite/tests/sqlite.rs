#[cfg(test)]
mod tests {
    use sluice_core::{ContextConfig, DbContext};
    use sluice_sqlite::SqliteDriver;
    use sluice_tests::{execute_tests, init_logs};

    #[test]
    fn sqlite() {
        init_logs();
        let directory = tempfile::tempdir().expect("Failed to create a temporary directory");
        let path = directory.path().join("tests.sqlite");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        execute_tests(|| DbContext::new(SqliteDriver, ContextConfig::new(url.clone())));
    }
}
