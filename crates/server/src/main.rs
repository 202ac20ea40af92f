#[tokio::main]
async fn main() -> anyhow::Result<()> {
    racar_server::server::run().await
}
