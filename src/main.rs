mod api; // HTTP API
mod config;
mod error;
mod handlers;
mod models;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use api::server::create_router;
use config::Config;
use handlers::{MealHandler, SessionSweeper};
use services::{OpenRouterService, SessionStore, VisionModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting PCOS Meal Coach...");

    let config = Config::from_env()?;

    let model = Arc::new(OpenRouterService::new(
        config.openrouter_api_key.clone(),
        config.openrouter_model.clone(),
    )) as Arc<dyn VisionModel>;
    log::info!("✅ OpenRouter service initialized with model: {}", config.openrouter_model);

    let sessions = Arc::new(SessionStore::new(&config.session_secret)?);
    log::info!("✅ Session store initialized");

    let meal_handler = Arc::new(MealHandler::new(
        sessions.clone(),
        model,
        config.timezone,
    ));
    log::info!("✅ Meal handler initialized (timezone: {})", config.timezone);

    let mut sweeper = SessionSweeper::new(
        sessions.clone(),
        chrono::Duration::minutes(config.session_ttl_minutes),
    )
    .await?;
    sweeper.start().await?;

    let app = create_router(
        meal_handler,
        sessions,
        config.max_upload_bytes,
        config.static_dir.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 API server listening on {}", config.bind_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("❌ API server stopped: {}", e);
        }
    });

    log::info!("🎉 PCOS Meal Coach is ready!");
    println!("\n🥗 PCOS Meal Coach running on http://{}", config.bind_addr);
    println!("🛑 Press Ctrl+C to stop\n");

    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");
    sweeper.stop().await?;

    Ok(())
}
