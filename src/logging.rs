use env_logger::{Builder, Env};

/// Filter applied when the filter variable is unset. Metric lines are logged at info, so they
/// show up on stdout without any configuration.
pub const DEFAULT_FILTER: &str = "info";

/// Logger configured from `filter_var` (normally `RUST_LOG`), falling back to `DEFAULT_FILTER`.
pub fn builder(filter_var: &str) -> Builder {
    Builder::from_env(Env::default().filter_or(filter_var, DEFAULT_FILTER))
}

pub fn init() {
    builder(env_logger::DEFAULT_FILTER_ENV).init();
}
