#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pitchside_server::run().await
}
