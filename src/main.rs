#[tokio::main]
async fn main() -> ontoform::Result<()> {
    ontoform::cli::main().await
}
