use crate::{cli::actions::Action, ligilo};
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn, globals } => {
            // Reject a malformed DSN here instead of deep inside the pool.
            Url::parse(&dsn).context("Invalid database connection string")?;

            ligilo::new(port, dsn, globals).await?;
        }
    }

    Ok(())
}
