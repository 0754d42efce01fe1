use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
    pub smtp: Option<SmtpSettings>,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    /// Base URL the OAuth providers redirect back to.
    pub public_url: String,
}

impl AppSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthSettings {
    pub google: Option<ProviderSettings>,
    pub github: Option<ProviderSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
    /// Implicit TLS (usually port 465). Otherwise the connection is upgraded with STARTTLS.
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub inactivity_minutes: i64,
}

/// Reads `.env`, then an optional `configuration.{yaml,toml,json}`, then
/// `MENTOR__SECTION__KEY` environment variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    dotenv::dotenv().ok();

    config::Config::builder()
        .set_default("app.host", "0.0.0.0")?
        .set_default("app.port", 8080)?
        .set_default("app.public_url", "http://localhost:8080")?
        .set_default("database.url", "sqlite://mentor.db?mode=rwc")?
        .set_default("database.max_connections", 16)?
        .set_default("session.inactivity_minutes", 60)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("MENTOR")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}
