use anyhow::Context;
use mongodb::{
    bson::doc,
    options::IndexOptions,
    Client, Database, IndexModel,
};

use crate::auth::repo::User;
use crate::config::AppConfig;

/// Connects to the document store and prepares indexes. A missing or
/// unreachable store is fatal at startup.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .context("connect to mongodb")?;
    let db = client.database(&config.mongo_db);
    ensure_indexes(&db).await?;
    tracing::info!(db = %config.mongo_db, "mongodb connected");
    Ok(db)
}

async fn ensure_indexes(db: &Database) -> anyhow::Result<()> {
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    db.collection::<User>("users")
        .create_index(unique_email)
        .await
        .context("create unique email index")?;
    Ok(())
}
