use homework_bot::notification::TelegramNotifier;
use homework_bot::poller::HomeworkPoller;
use homework_bot::practicum::PracticumClient;
use homework_bot::utils::http_client;
use homework_bot::{Config, logging};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;
    logging::install_panic_hook();

    // Missing credentials end the process here, before any request is made.
    let config = Config::from_env()?;
    info!(
        endpoint = %config.endpoint,
        chat_id = %config.credentials.telegram_chat_id,
        locale = ?config.locale,
        "Configuration loaded"
    );

    let client = http_client::build_client(config.request_timeout)?;
    let api = PracticumClient::with_client(client.clone(), &config);
    let notifier = TelegramNotifier::with_client(client, &config);
    let poller = HomeworkPoller::new(&config, api, notifier);

    tokio::select! {
        _ = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received shutdown signal, stopping");
        }
    }

    Ok(())
}
