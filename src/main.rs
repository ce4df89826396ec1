//! testproc CLI entry point

#[tokio::main]
async fn main() {
    // Structured logging on stderr so stdout stays machine-readable; env-based filter, defaulting to info
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    testproc::cli::run().await;
}
