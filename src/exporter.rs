//! Dump MySQL accounts and their grants as a replayable SQL script

use tracing::{debug, info};

use crate::db::{Account, AccountSource};
use crate::error::Result;

/// One exported account with its statements
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDefinition {
    pub account: Account,
    pub create_statement: String,
    pub grants: Vec<String>,
}

pub async fn collect_definitions(source: &dyn AccountSource) -> Result<Vec<AccountDefinition>> {
    let accounts = source.list_accounts().await?;
    info!("Exporting {} accounts", accounts.len());

    let mut definitions = Vec::with_capacity(accounts.len());
    for account in accounts {
        debug!("Reading definition of {}", account);
        let create_statement = source.show_create_user(&account).await?;
        let grants = source.show_grants(&account).await?;
        definitions.push(AccountDefinition {
            account,
            create_statement,
            grants,
        });
    }

    Ok(definitions)
}

pub fn render_script(definitions: &[AccountDefinition]) -> String {
    let mut script = format!("-- {} exported accounts\n", definitions.len());

    for definition in definitions {
        script.push('\n');
        script.push_str(&format!("-- {}\n", definition.account));
        push_statement(&mut script, &definition.create_statement);
        for grant in &definition.grants {
            push_statement(&mut script, grant);
        }
    }

    script
}

fn push_statement(script: &mut String, statement: &str) {
    let statement = statement.trim().trim_end_matches(';');
    if statement.is_empty() {
        return;
    }
    script.push_str(statement);
    script.push_str(";\n");
}

pub async fn export_script(source: &dyn AccountSource) -> Result<String> {
    let definitions = collect_definitions(source).await?;
    Ok(render_script(&definitions))
}
