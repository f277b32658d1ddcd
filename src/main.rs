use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use zoom_api::{CancellationToken, PageRequest, UserStatus, ZoomClient};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    let credentials = match config.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Invalid Zoom configuration: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Connecting to Zoom [{}] using {} grant",
        config.zoom_api_base_url,
        credentials.grant_type().as_str()
    );

    let client = match ZoomClient::with_options(credentials, config.client_options()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Zoom client: {e}");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            ctrl_c.cancel();
        }
    });

    if let Err(e) = list_users(&client, config.page_size, &cancel).await {
        error!("Failed to list users: {e}");
        std::process::exit(1);
    }
}

async fn list_users(
    client: &ZoomClient,
    page_size: u32,
    cancel: &CancellationToken,
) -> Result<(), zoom_api::Error> {
    let mut page = PageRequest::first(page_size);
    let mut listed = 0;

    loop {
        let users = client.users().list(UserStatus::Active, &page, cancel).await?;
        for user in &users.records {
            listed += 1;
            println!(
                "{}\t{}\t{} {}",
                user.id,
                user.email.as_deref().unwrap_or("-"),
                user.first_name.as_deref().unwrap_or(""),
                user.last_name.as_deref().unwrap_or(""),
            );
        }

        match users.next_page() {
            Some(next) => page = next,
            None => break,
        }
    }

    info!("Listed {listed} active users");
    Ok(())
}
