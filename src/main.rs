use clap::Parser;
use replaytrader::cli::{init_tracing, run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {e}");
        return std::process::ExitCode::from(2);
    }
    run(cli)
}
