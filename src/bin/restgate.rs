use clap::Parser;
use restgate::cli::{run_cli, Cli};
use restgate::telemetry::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;
    let stdout = std::io::stdout();
    run_cli(cli, &mut stdout.lock())
}
