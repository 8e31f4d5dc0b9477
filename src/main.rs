use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    scholarsync::run().await
}
