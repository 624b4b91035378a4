//! foliofetch CLI — static-site content preparation tool.
//!
//! Clones the writeups repository and fetches project READMEs from GitHub,
//! emitting frontmattered markdown under the site's content root.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
