//! `hxstream` command-line entry point

fn main() -> anyhow::Result<()> {
    hxstream::cli::run_cli()
}
