#[tokio::main]
async fn main() -> sentientbot::error::Result<()> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("sentientbot=info,teloxide=warn"),
    )
    .init();
    log::info!("Starting sentientbot Telegram bot");

    match sentientbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
