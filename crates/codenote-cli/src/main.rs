// codenote CLI entry point

use codenote_cli::{output, router::CommandRouter, VerbosityLevel};

#[tokio::main]
async fn main() {
    let result = CommandRouter::route().await;

    if let Err(e) = result {
        output::print_error(&e.user_message());
        if VerbosityLevel::Verbose.should_output() {
            eprintln!("{}", e.technical_details());
        }
        std::process::exit(e.exit_code());
    }
}
