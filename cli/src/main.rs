use clap::Parser;
use promptworks_cli::{Cli, CliError, build_session, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).with_writer(std::io::stderr).init();

    let session = build_session(&cli.base_url, cli.token_file)?;
    let output = run(&session, cli.command).await?;
    if !output.is_null() {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

