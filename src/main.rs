mod cli;

use anyhow::Result;
use clap::Parser;

use laie::config::Config;
use laie::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    cli.run(config).await
}
