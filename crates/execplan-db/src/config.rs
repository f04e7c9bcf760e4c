/// Database configuration.
///
/// The URL normally comes from the CLI config chain, which consults
/// [`DbConfig::ENV_VAR`] and falls back to [`DbConfig::DEFAULT_URL`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// The connection URL used when nothing else is configured.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/execplan";

    /// Environment variable holding the connection URL.
    pub const ENV_VAR: &str = "EXECPLAN_DATABASE_URL";

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Extract the database name from the URL.
    ///
    /// Query parameters (`?sslmode=...`) are ignored. Returns `None` when the
    /// URL has no path component.
    pub fn database_name(&self) -> Option<&str> {
        let (base, _query) = self.split_query();
        let after_scheme = base.split_once("://").map_or(base, |(_, rest)| rest);
        let (_authority, name) = after_scheme.split_once('/')?;
        Some(name).filter(|s| !s.is_empty())
    }

    /// Return a URL pointing at the `postgres` maintenance database on the
    /// same server. Query parameters (TLS settings and the like) carry over.
    /// Used to issue `CREATE DATABASE` when the target DB does not yet exist.
    pub fn maintenance_url(&self) -> String {
        let (base, query) = self.split_query();
        let scheme_end = base.find("://").map_or(0, |i| i + 3);
        let server = match base[scheme_end..].find('/') {
            Some(slash) => &base[..scheme_end + slash],
            None => base,
        };
        match query {
            Some(query) => format!("{server}/postgres?{query}"),
            None => format!("{server}/postgres"),
        }
    }

    /// `(everything before '?', query string)`.
    fn split_query(&self) -> (&str, Option<&str>) {
        match self.database_url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.database_url.as_str(), None),
        }
    }
}
