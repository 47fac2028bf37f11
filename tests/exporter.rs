use async_trait::async_trait;
use cicd_glue::db::{Account, AccountSource};
use cicd_glue::error::{GlueError, Result};
use cicd_glue::exporter::{collect_definitions, export_script};
use std::collections::HashMap;

/// In-memory stand-in for the mysql.user introspection queries
struct FakeAccounts {
    accounts: Vec<Account>,
    grants: HashMap<String, Vec<String>>,
    broken: Option<String>,
}

impl FakeAccounts {
    fn new() -> Self {
        let accounts = vec![
            Account::new("app", "%"),
            Account::new("reporting", "10.0.%"),
            Account::new("migrator", "%"),
        ];
        let grants = accounts
            .iter()
            .map(|a| {
                let mut grants = vec![format!("GRANT USAGE ON *.* TO `{}`@`{}`", a.user, a.host)];
                if a.user == "app" {
                    grants.push("GRANT SELECT, INSERT ON `shop`.* TO `app`@`%`".to_string());
                }
                (a.user.clone(), grants)
            })
            .collect();
        Self {
            accounts,
            grants,
            broken: None,
        }
    }
}

#[async_trait]
impl AccountSource for FakeAccounts {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    async fn show_create_user(&self, account: &Account) -> Result<String> {
        if self.broken.as_deref() == Some(account.user.as_str()) {
            return Err(GlueError::DatabaseError(sqlx::Error::RowNotFound));
        }
        Ok(format!(
            "CREATE USER `{}`@`{}` IDENTIFIED WITH 'caching_sha2_password' AS '***'",
            account.user, account.host
        ))
    }

    async fn show_grants(&self, account: &Account) -> Result<Vec<String>> {
        Ok(self.grants.get(&account.user).cloned().unwrap_or_default())
    }
}

fn statements(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .collect()
}

#[tokio::test]
async fn one_create_and_grants_per_account() {
    let source = FakeAccounts::new();
    let script = export_script(&source).await.unwrap();
    let statements = statements(&script);

    let creates: Vec<_> = statements
        .iter()
        .filter(|s| s.starts_with("CREATE USER"))
        .collect();
    assert_eq!(creates.len(), 3);

    for account in &source.accounts {
        let needle = format!("TO `{}`@`{}`", account.user, account.host);
        assert!(
            statements
                .iter()
                .any(|s| s.starts_with("GRANT") && s.contains(&needle)),
            "no grant for {}",
            account
        );
    }

    assert!(statements.iter().all(|s| s.ends_with(';')));
    assert!(script.starts_with("-- 3 exported accounts\n"));
}

#[tokio::test]
async fn accounts_keep_listing_order() {
    let source = FakeAccounts::new();
    let definitions = collect_definitions(&source).await.unwrap();
    let users: Vec<_> = definitions.iter().map(|d| d.account.user.as_str()).collect();
    assert_eq!(users, ["app", "reporting", "migrator"]);
    assert_eq!(definitions[0].grants.len(), 2);
}

#[tokio::test]
async fn database_errors_propagate() {
    let mut source = FakeAccounts::new();
    source.broken = Some("reporting".to_string());

    let err = export_script(&source).await.unwrap_err();
    assert!(matches!(err, GlueError::DatabaseError(_)));
}
