use clap::Parser;
use inspector_cli::{init_logging, run, Cli};

#[tokio::main]
async fn main() {
    #[cfg(unix)]
    reset_sigpipe();

    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
