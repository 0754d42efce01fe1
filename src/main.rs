use std::sync::Arc;

use askbitsians::{app, auth, db, mail::{LogMailer, SharedMailer, SmtpMailer}, settings, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("info");

    let settings = settings::get_configuration()?;

    let db_pool = db::connect(&settings.database).await?;
    tracing::info!(url = %settings.database.url, "database ready");

    let clients = auth::Clients::from_settings(&settings.oauth, &settings.app.public_url)
        .map_err(|e| anyhow::anyhow!("oauth settings: {e:?}"))?;
    tracing::info!(providers = ?clients.providers(), "oauth configured");

    let mailer: SharedMailer = match &settings.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            tracing::warn!("smtp is not configured, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let app_state = AppState::new(db_pool, clients, mailer);
    let app = app(app_state, settings.session.inactivity_minutes);

    let address = settings.app.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
