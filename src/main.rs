#[tokio::main]
async fn main() {
    if let Err(e) = ferreteria_server::run_with_config().await {
        eprintln!("ferreteria_server failed to start: {e}");
        std::process::exit(1);
    }
}
