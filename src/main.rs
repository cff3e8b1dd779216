use anyhow::Result;
use pipewright::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args()?;
    let args = pipewright::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
