#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vaultcards_cli::run().await
}
