use insights_forwarder::cli;

pub fn main() -> anyhow::Result<()> {
    cli::process_command()
}
