use crate::cli::globals::GlobalArgs;

pub mod server;

/// Actions the CLI can dispatch.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        globals: GlobalArgs,
    },
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Server { .. } => server::handle(self).await,
        }
    }
}
