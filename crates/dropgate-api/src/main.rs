use dropgate_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, CAPTCHA verifier, routes)
    let (_state, router) = dropgate_api::setup::initialize_app(&config).await?;

    // Start the server
    dropgate_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
