#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    mdedit_client::init_tracing();
    mdedit_client::run().await
}
