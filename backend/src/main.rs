#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dodle::start_server().await
}
