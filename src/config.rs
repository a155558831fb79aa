use serde::{Deserialize, Serialize};
use tiberius::{AuthMethod, Config as TiberiusConfig};

/// Connection settings for a SQL Server.
///
/// This layer performs no validation; the settings are handed to the driver
/// as-is when a connection is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MssqlConfig {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub application_name: Option<String>,
    /// Skip server certificate validation. Leave off outside development.
    #[serde(default)]
    pub trust_cert: bool,
}

impl MssqlConfig {
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            user: user.into(),
            password: password.into(),
            port: None,
            instance_name: None,
            application_name: None,
            trust_cert: false,
        }
    }

    /// Fluent builder over [`MssqlConfig::new`].
    #[must_use]
    pub fn builder(
        server: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> MssqlConfigBuilder {
        MssqlConfigBuilder {
            config: Self::new(server, database, user, password),
        }
    }

    /// The port connections go to when none is configured.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(1433)
    }

    pub(crate) fn to_tiberius(&self) -> TiberiusConfig {
        let mut config = TiberiusConfig::new();
        config.host(&self.server);
        config.database(&self.database);
        config.port(self.port());
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        if let Some(instance) = &self.instance_name {
            config.instance_name(instance);
        }
        if let Some(app) = &self.application_name {
            config.application_name(app);
        }
        if self.trust_cert {
            config.trust_cert();
        }
        config
    }
}

/// Fluent builder for connection settings.
#[derive(Debug, Clone)]
pub struct MssqlConfigBuilder {
    config: MssqlConfig,
}

impl MssqlConfigBuilder {
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    #[must_use]
    pub fn instance_name(mut self, instance_name: impl Into<String>) -> Self {
        self.config.instance_name = Some(instance_name.into());
        self
    }

    #[must_use]
    pub fn application_name(mut self, application_name: impl Into<String>) -> Self {
        self.config.application_name = Some(application_name.into());
        self
    }

    #[must_use]
    pub fn trust_cert(mut self) -> Self {
        self.config.trust_cert = true;
        self
    }

    #[must_use]
    pub fn finish(self) -> MssqlConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_applies_when_unset() {
        let config = MssqlConfig::new("localhost", "master", "sa", "pw");
        assert_eq!(config.port(), 1433);

        let config = MssqlConfig::builder("localhost", "master", "sa", "pw")
            .port(14330)
            .finish();
        assert_eq!(config.port(), 14330);
    }

    #[test]
    fn builder_sets_optional_fields() {
        let config = MssqlConfig::builder("db.example.com", "app", "user", "pw")
            .instance_name("SQLEXPRESS")
            .application_name("easy-mssql-tests")
            .trust_cert()
            .finish();
        assert_eq!(config.instance_name.as_deref(), Some("SQLEXPRESS"));
        assert_eq!(config.application_name.as_deref(), Some("easy-mssql-tests"));
        assert!(config.trust_cert);
    }
}
