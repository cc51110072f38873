#[tokio::main]
async fn main() {
    landing::start_server().await;
}
