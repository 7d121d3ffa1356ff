/// Effectkit CLI
///
/// Runs the sample computations through their interpreter stacks.
use effectkit_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
