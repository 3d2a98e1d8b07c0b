//! LanceDB connection helpers.
use lancedb::{connect, Connection};

use paperrag_core::error::{Error, Result};

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(Error::backend)
}

/// Row count of a table, `None` when the table does not exist.
pub async fn count_rows(conn: &Connection, name: &str) -> Result<Option<usize>> {
    let names = conn.table_names().execute().await.map_err(Error::backend)?;
    if !names.contains(&name.to_string()) { return Ok(None); }
    let t = conn.open_table(name).execute().await.map_err(Error::backend)?;
    Ok(Some(t.count_rows(None).await.map_err(Error::backend)?))
}
