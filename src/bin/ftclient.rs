use clap::Parser;
use ftserver::constants::EXIT_FAILURE_CODE;
use ftserver::core_client::{run_request, ClientCli, Transfer};
use ftserver::core_log;
use log::{error, info};
use std::io::Write;

#[tokio::main]
async fn main() {
    let args = match ClientCli::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            eprint!("{}", e.render());
            std::process::exit(EXIT_FAILURE_CODE);
        }
    };

    core_log::logger::init_logger(args.verbose);

    let outcome = match (args.request(), args.options()) {
        (Ok(request), Ok(options)) => run_request(&options, &request).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    match outcome {
        Ok(Transfer::Listing(listing)) => {
            let mut stdout = std::io::stdout();
            if let Err(e) = stdout.write_all(&listing).and_then(|_| stdout.flush()) {
                error!("Failed to print the listing: {}", e);
                std::process::exit(EXIT_FAILURE_CODE);
            }
        }
        Ok(Transfer::Saved { path, bytes }) => {
            info!("File transfer complete: {} bytes saved to {:?}", bytes, path);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
