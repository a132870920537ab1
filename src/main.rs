use clap::Parser;

use pastillas_lib::cli::Cli;
use pastillas_lib::error::ErrorReport;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    pastillas_lib::init_tracing();

    let json = cli.json;
    if let Err(e) = pastillas_lib::commands::dispatch(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        if json {
            let report = ErrorReport::from(&e);
            match serde_json::to_string(&report) {
                Ok(rendered) => eprintln!("{rendered}"),
                Err(_) => eprintln!("{e}"),
            }
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
