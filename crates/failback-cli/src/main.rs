//! Thin entrypoint delegating to [`failback_cli::run`].

#[tokio::main]
async fn main() {
    let exit_code = failback_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
