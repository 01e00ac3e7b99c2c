#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kedi_cli::run().await
}
