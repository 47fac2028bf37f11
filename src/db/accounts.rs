use async_trait::async_trait;
use sqlx::{FromRow, MySqlPool, Row};
use std::fmt;

use crate::error::{GlueError, Result};
use crate::utils::quote_sql_identifier;

/// A MySQL account, `user@host`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: String,
    pub host: String,
}

impl Account {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }

    /// The account in `` `user`@`host` `` form, safe to splice into SHOW statements.
    pub fn quoted(&self) -> String {
        format!(
            "{}@{}",
            quote_sql_identifier(&self.user),
            quote_sql_identifier(&self.host)
        )
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// Introspection queries the exporter needs
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Accounts to export: everything except root and local-only accounts.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    async fn show_create_user(&self, account: &Account) -> Result<String>;

    async fn show_grants(&self, account: &Account) -> Result<Vec<String>>;
}

// User/Host are binary-collated CHAR columns; read them as bytes.
#[derive(FromRow)]
struct AccountRow {
    user: Vec<u8>,
    host: Vec<u8>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            user: String::from_utf8_lossy(&row.user).into_owned(),
            host: String::from_utf8_lossy(&row.host).into_owned(),
        }
    }
}

pub const LIST_ACCOUNTS_SQL: &str = r#"
    SELECT User AS user, Host AS host
    FROM mysql.user
    WHERE User <> 'root'
      AND Host NOT IN ('localhost', '127.0.0.1', '::1')
    ORDER BY User, Host
"#;

/// The CREATE statement from a SHOW CREATE USER result; an empty or blank
/// result is an error so no account goes out without one.
fn first_statement(rows: Vec<String>) -> Result<String> {
    rows.into_iter()
        .next()
        .filter(|statement| !statement.trim().is_empty())
        .ok_or(GlueError::DatabaseError(sqlx::Error::RowNotFound))
}

#[derive(Clone)]
pub struct MySqlAccounts {
    pool: MySqlPool,
}

impl MySqlAccounts {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // SHOW statements cannot take bound parameters, so they go over the text protocol.
    async fn show(&self, sql: &str) -> Result<Vec<String>> {
        let rows = sqlx::raw_sql(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<String> {
                let bytes: Vec<u8> = row.try_get(0)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            })
            .collect()
    }
}

#[async_trait]
impl AccountSource for MySqlAccounts {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(LIST_ACCOUNTS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn show_create_user(&self, account: &Account) -> Result<String> {
        let rows = self
            .show(&format!("SHOW CREATE USER {}", account.quoted()))
            .await?;
        first_statement(rows)
    }

    async fn show_grants(&self, account: &Account) -> Result<Vec<String>> {
        self.show(&format!("SHOW GRANTS FOR {}", account.quoted()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_account() {
        let account = Account::new("app", "%");
        assert_eq!(account.quoted(), "`app`@`%`");
        assert_eq!(account.to_string(), "app@%");
        assert_eq!(Account::new("o'neil", "10.%").quoted(), "`o'neil`@`10.%`");
    }

    #[test]
    fn create_statement_must_be_present() {
        let statement = first_statement(vec!["CREATE USER `app`@`%`".to_string()]).unwrap();
        assert_eq!(statement, "CREATE USER `app`@`%`");

        let err = first_statement(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            GlueError::DatabaseError(sqlx::Error::RowNotFound)
        ));
        assert!(first_statement(vec!["  ".to_string()]).is_err());
    }

    #[test]
    fn listing_excludes_root_and_local() {
        assert!(LIST_ACCOUNTS_SQL.contains("User <> 'root'"));
        assert!(LIST_ACCOUNTS_SQL.contains("'localhost'"));
    }
}
