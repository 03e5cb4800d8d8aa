use serde::Deserialize;

/// Top-level configuration for the Chairside server, loaded from a TOML
/// file. Every section has defaults so an absent file yields a working
/// development configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ChairsideConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session validation configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP bind address configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Host to bind, e.g. `0.0.0.0`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// One statically configured session token.
///
/// Real deployments plug a portal-backed [`crate::session::SessionValidator`]
/// in; the static list exists for development and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticSession {
    /// Value of the `portal_session` cookie.
    pub token: String,
    /// User ID the token resolves to.
    pub user_id: String,
    /// Display name for that user.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Session validation configuration.
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    /// Statically accepted sessions.
    ///
    /// ```toml
    /// [[session.static_sessions]]
    /// token = "dev"
    /// user_id = "dev"
    /// display_name = "Developer"
    /// ```
    #[serde(default)]
    pub static_sessions: Vec<StaticSession>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ChairsideConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.session.static_sessions.is_empty());
    }

    #[test]
    fn sections_parse() {
        let config: ChairsideConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [[session.static_sessions]]
            token = "dev"
            user_id = "dev"
            display_name = "Developer"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.session.static_sessions.len(), 1);
        assert_eq!(config.session.static_sessions[0].token, "dev");
    }
}
