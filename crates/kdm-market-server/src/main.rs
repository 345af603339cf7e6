#[tokio::main]
async fn main() {
    kdm_market_server::start_server().await;
}
