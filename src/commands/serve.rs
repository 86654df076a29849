use super::Context;
use crate::api::IdentityChain;
use crate::db::db::{Db, DB_FILE_NAME};
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_warning;
use crate::server::{self, AppState};
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn cmd(context: &Context, args: ServeArgs) -> Result<()> {
    let db_path = DataStorage::new().get_path(DB_FILE_NAME)?;
    // Apply pending migrations once up front instead of on the first request
    Db::open(&db_path)?;

    let state = AppState::new(
        db_path,
        IdentityChain::from_config(&context.config.identity),
        Arc::new(context.config.clock()),
    );

    let bind = args.bind.unwrap_or_else(|| context.config.server.bind.clone());
    let listener = TcpListener::bind(&bind).await?;
    let addr = listener.local_addr()?;
    if context.config.identity.header_trust_exposed(&addr) {
        msg_warning!(Message::HeaderIdentityExposed(addr.to_string()));
    }
    server::serve(listener, state).await?;
    Ok(())
}
