//! GameZone headless driver: log in, open a route, print its view model.

use gamezone_app::cli::CliArgs;
use gamezone_app::error::AppError;
use gamezone_app::logging::init_tracing;
use gamezone_app::App;
use gamezone_client::{ClientConfig, ClientContext};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = CliArgs::from_env()?;
    let config = ClientConfig::load()?;
    init_tracing(config.log_format)?;

    let ctx = ClientContext::from_config(config)?;
    let mut app = App::new(ctx);

    if let Some(credentials) = &args.credentials {
        if !app.login(credentials).await {
            return Err(AppError::LoginFailed(format!("{:?}", credentials.role())));
        }
    }

    app.navigate(&args.route);
    tracing::info!(route = %app.route(), "loading view");
    let model = app.load_current().await;

    let output = serde_json::json!({
        "route": app.route(),
        "identity": app.identity(),
        "view": model,
        "notifications": app.notifications,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
