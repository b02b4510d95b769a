//! Shared helpers for unit tests

/// Route `tracing` output to the test writer; safe to call from every test
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_state=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
