use std::fmt;

use serde::Deserialize;

use crate::notes::ExportFormat;

#[derive(Deserialize, Clone)]
pub struct Config {
    /// Bot API credential, `BOT_TOKEN`.
    pub bot_token: String,
    /// When set, commands addressed to another bot (`/view@other_bot`) are ignored.
    pub bot_username: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value.
    pub webhook_secret: Option<String>,

    #[serde(default)]
    pub export_format: ExportFormat,
    #[serde(default)]
    pub log_json: bool,

    // build
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "notes.db".into()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".into()
}

fn default_webhook_path() -> String {
    "/webhook".into()
}

fn default_local() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()?.validated()
    }

    /// Rejects values that would only fail later, when the router is built.
    fn validated(self) -> Result<Self, envy::Error> {
        if !self.webhook_path.starts_with('/') {
            return Err(envy::Error::Custom(format!(
                "WEBHOOK_PATH must start with `/`, got `{}`",
                self.webhook_path
            )));
        }
        Ok(self)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("bot_username", &self.bot_username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("webhook_path", &self.webhook_path)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("export_format", &self.export_format)
            .field("log_json", &self.log_json)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(telegram_api_url: impl Into<String>) -> Self {
        Self {
            bot_token: "test-token".into(),
            bot_username: Some("memo_bot".into()),
            host: default_host(),
            port: 0,
            database_url: ":memory:".into(),
            telegram_api_url: telegram_api_url.into(),
            webhook_path: default_webhook_path(),
            webhook_secret: None,
            export_format: ExportFormat::Flat,
            log_json: false,
            source: default_local(),
            git_commit: default_local(),
            pipeline_id: default_local(),
            version: default_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = envy::from_iter::<_, Config>(vars(&[("BOT_TOKEN", "123:abc")])).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_url, "notes.db");
        assert_eq!(config.webhook_path, "/webhook");
        assert_eq!(config.export_format, ExportFormat::Flat);
        assert!(config.webhook_secret.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn token_is_required() {
        assert!(envy::from_iter::<_, Config>(vars(&[("PORT", "8080")])).is_err());
    }

    #[test]
    fn export_format_is_parsed() {
        let config =
            envy::from_iter::<_, Config>(vars(&[("BOT_TOKEN", "t"), ("EXPORT_FORMAT", "grouped")])).unwrap();
        assert_eq!(config.export_format, ExportFormat::Grouped);
    }

    #[test]
    fn webhook_path_needs_a_leading_slash() {
        let load = |path: &str| {
            envy::from_iter::<_, Config>(vars(&[("BOT_TOKEN", "t"), ("WEBHOOK_PATH", path)]))
                .and_then(Config::validated)
        };

        assert_eq!(load("/hooks/telegram").unwrap().webhook_path, "/hooks/telegram");
        let err = load("webhook").unwrap_err();
        assert!(matches!(err, envy::Error::Custom(message) if message.contains("WEBHOOK_PATH")));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = envy::from_iter::<_, Config>(vars(&[("BOT_TOKEN", "secret-token")])).unwrap();
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
