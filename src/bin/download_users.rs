//! Users XML download job
//!
//! Fetches `USERS_XML_URL` into `USER_DATA_XML`. Meant to be run periodically
//! (e.g. from cron) next to the server.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presence_analyzer::{data::download_users_xml, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presence_analyzer=info,download_users=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let client = reqwest::Client::new();

    let written = download_users_xml(&client, &config.users_xml_url, &config.user_data_xml).await?;
    if !written {
        info!("Users file left unchanged");
    }
    Ok(())
}
