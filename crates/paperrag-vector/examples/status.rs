//! Print row counts of the local Lance tables named in the configuration.
use paperrag_core::config::{Config, IndexSettings};
use paperrag_vector::table;

async fn report(label: &str, settings: &IndexSettings) -> anyhow::Result<()> {
    let Some(path) = settings.lance_path() else {
        println!("{label}: {} (not a lance index)", settings.name);
        return Ok(());
    };
    let conn = table::open_db(&path.to_string_lossy()).await?;
    match table::count_rows(&conn, &settings.name).await? {
        Some(rows) => println!("{label}: {} rows={rows}", settings.name),
        None => println!("{label}: {} missing in {}", settings.name, path.display()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Only the index sections are read; credentials for other stages are not required here.
    let config = Config::load()?;
    report("text", &config.get("text_index")?).await?;
    report("image", &config.get("image_index")?).await?;
    Ok(())
}
