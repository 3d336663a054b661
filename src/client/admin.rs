//! Administrative statements: measurements, users, privileges, continuous
//! queries and retention policies.
//!
//! Every operation is one `POST /query` whose results are checked for
//! statement errors.

use std::fmt;

use crate::client::{quote_identifier, quote_string, ClientResult, InfluxClient};
use crate::transport::Transport;

/// Privilege granted on one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Read,
    Write,
    All,
}

impl Privilege {
    pub fn as_str(self) -> &'static str {
        match self {
            Privilege::Read => "READ",
            Privilege::Write => "WRITE",
            Privilege::All => "ALL",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for creating or altering a retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicyOptions {
    /// Overrides the configured default database.
    pub database: Option<String>,
    /// Duration literal such as `7d` or `INF`.
    pub duration: String,
    pub replication: u32,
    pub is_default: bool,
}

impl<T: Transport> InfluxClient<T> {
    pub async fn drop_measurement(&self, measurement: &str, database: Option<&str>) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        self.statement(
            &format!("drop measurement {}", quote_identifier(measurement)),
            Some(database),
        )
        .await
        .map(|_| ())
    }

    /// Create a user; `admin` grants all privileges at creation.
    pub async fn create_user(&self, username: &str, password: &str, admin: bool) -> ClientResult<()> {
        let mut query = format!(
            "create user {} with password {}",
            quote_identifier(username),
            quote_string(password)
        );
        if admin {
            query.push_str(" with all privileges");
        }
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn set_password(&self, username: &str, password: &str) -> ClientResult<()> {
        let query = format!(
            "set password for {} = {}",
            quote_identifier(username),
            quote_string(password)
        );
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn drop_user(&self, username: &str) -> ClientResult<()> {
        self.statement(&format!("drop user {}", quote_identifier(username)), None)
            .await
            .map(|_| ())
    }

    pub async fn grant_privilege(
        &self,
        username: &str,
        privilege: Privilege,
        database: Option<&str>,
    ) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        let query = format!(
            "grant {} on {} to {}",
            privilege,
            quote_identifier(database),
            quote_identifier(username)
        );
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn revoke_privilege(
        &self,
        username: &str,
        privilege: Privilege,
        database: Option<&str>,
    ) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        let query = format!(
            "revoke {} on {} from {}",
            privilege,
            quote_identifier(database),
            quote_identifier(username)
        );
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn grant_admin_privilege(&self, username: &str) -> ClientResult<()> {
        self.statement(&format!("grant all to {}", quote_identifier(username)), None)
            .await
            .map(|_| ())
    }

    pub async fn revoke_admin_privilege(&self, username: &str) -> ClientResult<()> {
        self.statement(&format!("revoke all from {}", quote_identifier(username)), None)
            .await
            .map(|_| ())
    }

    /// Create a continuous query. `query` is the already-built select
    /// statement; `resample` is an optional `resample ...` clause.
    pub async fn create_continuous_query(
        &self,
        name: &str,
        query: &str,
        database: Option<&str>,
        resample: Option<&str>,
    ) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        let mut statement = format!(
            "create continuous query {} on {}",
            quote_identifier(name),
            quote_identifier(database)
        );
        if let Some(resample) = resample.filter(|r| !r.is_empty()) {
            statement.push(' ');
            statement.push_str(resample);
        }
        statement.push_str(&format!(" begin {} end", query));
        self.statement(&statement, None).await.map(|_| ())
    }

    pub async fn drop_continuous_query(&self, name: &str, database: Option<&str>) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        let query = format!(
            "drop continuous query {} on {}",
            quote_identifier(name),
            quote_identifier(database)
        );
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn create_retention_policy(
        &self,
        name: &str,
        options: &RetentionPolicyOptions,
    ) -> ClientResult<()> {
        let query = self.retention_policy_statement("create", name, options)?;
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn alter_retention_policy(
        &self,
        name: &str,
        options: &RetentionPolicyOptions,
    ) -> ClientResult<()> {
        let query = self.retention_policy_statement("alter", name, options)?;
        self.statement(&query, None).await.map(|_| ())
    }

    pub async fn drop_retention_policy(&self, name: &str, database: Option<&str>) -> ClientResult<()> {
        let database = self.resolve_database(database)?;
        let query = format!(
            "drop retention policy {} on {}",
            quote_identifier(name),
            quote_identifier(database)
        );
        self.statement(&query, None).await.map(|_| ())
    }

    fn retention_policy_statement(
        &self,
        verb: &str,
        name: &str,
        options: &RetentionPolicyOptions,
    ) -> ClientResult<String> {
        let database = self.resolve_database(options.database.as_deref())?;
        let mut query = format!(
            "{} retention policy {} on {} duration {} replication {}",
            verb,
            quote_identifier(name),
            quote_identifier(database),
            options.duration,
            options.replication
        );
        if options.is_default {
            query.push_str(" default");
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::config::{ClusterConfig, HostConfig, PoolConfig};
    use crate::pool::request::Method;
    use crate::pool::Pool;
    use crate::transport::testing::{host_url, Scripted, ScriptedTransport};

    fn client(database: Option<&str>) -> InfluxClient<ScriptedTransport> {
        let hosts = vec![HostConfig::new("http", "a", 8086)];
        let pool =
            Pool::with_transport(&hosts, &PoolConfig::default(), ScriptedTransport::new()).unwrap();
        let config = ClusterConfig {
            database: database.map(str::to_string),
            username: "admin".into(),
            password: "secret".into(),
            hosts,
            ..ClusterConfig::default()
        };
        InfluxClient::with_pool(config, pool)
    }

    fn sent_query(client: &InfluxClient<ScriptedTransport>) -> String {
        let calls = client.pool().transport().calls();
        let call = calls.last().unwrap();
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.path, "/query");
        call.query
            .iter()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.clone())
            .unwrap()
    }

    fn sent_db(client: &InfluxClient<ScriptedTransport>) -> Option<String> {
        let calls = client.pool().transport().calls();
        calls
            .last()
            .unwrap()
            .query
            .iter()
            .find(|(k, _)| k == "db")
            .map(|(_, v)| v.clone())
    }

    #[tokio::test]
    async fn test_drop_measurement() {
        let client = client(Some("telemetry"));
        client.drop_measurement("cpu", None).await.unwrap();
        assert_eq!(sent_query(&client), r#"drop measurement "cpu""#);
        assert_eq!(sent_db(&client).as_deref(), Some("telemetry"));

        client.drop_measurement("mem", Some("other")).await.unwrap();
        assert_eq!(sent_db(&client).as_deref(), Some("other"));
    }

    #[tokio::test]
    async fn test_user_statements() {
        let client = client(None);

        client.create_user("bob", "it's", false).await.unwrap();
        assert_eq!(sent_query(&client), r#"create user "bob" with password 'it\'s'"#);

        client.create_user("root2", "pw", true).await.unwrap();
        assert_eq!(
            sent_query(&client),
            r#"create user "root2" with password 'pw' with all privileges"#
        );

        client.set_password("bob", "new").await.unwrap();
        assert_eq!(sent_query(&client), r#"set password for "bob" = 'new'"#);

        client.drop_user("bob").await.unwrap();
        assert_eq!(sent_query(&client), r#"drop user "bob""#);
        assert_eq!(sent_db(&client), None);
    }

    #[tokio::test]
    async fn test_privilege_statements() {
        let client = client(Some("telemetry"));

        client.grant_privilege("bob", Privilege::Read, None).await.unwrap();
        assert_eq!(sent_query(&client), r#"grant READ on "telemetry" to "bob""#);

        client
            .revoke_privilege("bob", Privilege::Write, Some("other"))
            .await
            .unwrap();
        assert_eq!(sent_query(&client), r#"revoke WRITE on "other" from "bob""#);

        client.grant_admin_privilege("bob").await.unwrap();
        assert_eq!(sent_query(&client), r#"grant all to "bob""#);

        client.revoke_admin_privilege("bob").await.unwrap();
        assert_eq!(sent_query(&client), r#"revoke all from "bob""#);
    }

    #[tokio::test]
    async fn test_privilege_needs_database() {
        let client = client(None);
        let err = client
            .grant_privilege("bob", Privilege::All, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoDatabase));
        assert!(client.pool().transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_continuous_query_statements() {
        let client = client(Some("telemetry"));

        client
            .create_continuous_query(
                "downsample",
                "select mean(value) into cpu_1h from cpu group by time(1h)",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(
            sent_query(&client),
            r#"create continuous query "downsample" on "telemetry" begin select mean(value) into cpu_1h from cpu group by time(1h) end"#
        );

        client
            .create_continuous_query("cq", "select 1", Some("other"), Some("resample every 30m"))
            .await
            .unwrap();
        assert_eq!(
            sent_query(&client),
            r#"create continuous query "cq" on "other" resample every 30m begin select 1 end"#
        );

        client.drop_continuous_query("cq", None).await.unwrap();
        assert_eq!(sent_query(&client), r#"drop continuous query "cq" on "telemetry""#);
    }

    #[tokio::test]
    async fn test_retention_policy_statements() {
        let client = client(Some("telemetry"));
        let mut options = RetentionPolicyOptions {
            database: None,
            duration: "7d".into(),
            replication: 1,
            is_default: true,
        };

        client.create_retention_policy("week", &options).await.unwrap();
        assert_eq!(
            sent_query(&client),
            r#"create retention policy "week" on "telemetry" duration 7d replication 1 default"#
        );

        options.is_default = false;
        options.duration = "14d".into();
        client.alter_retention_policy("week", &options).await.unwrap();
        assert_eq!(
            sent_query(&client),
            r#"alter retention policy "week" on "telemetry" duration 14d replication 1"#
        );

        client.drop_retention_policy("week", Some("other")).await.unwrap();
        assert_eq!(sent_query(&client), r#"drop retention policy "week" on "other""#);
    }

    #[tokio::test]
    async fn test_admin_statement_error_surfaces() {
        let client = client(None);
        client.pool().transport().push(
            &host_url("a"),
            Scripted::ok(r#"{"results":[{"statement_id":0,"error":"user already exists"}]}"#),
        );
        let err = client.create_user("bob", "pw", false).await.unwrap_err();
        assert!(matches!(err, ClientError::Statement(ref m) if m == "user already exists"));
    }
}
