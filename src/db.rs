use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use sectorx_backend::config::AppConfig;
use sectorx_backend::models::Document;
use sectorx_backend::storage::{DocumentStore, SqliteStore};

/// Connect the document store / 连接文档存储
pub async fn connect(config: &AppConfig) -> Result<SqliteStore> {
    let url = config.get_database_url();

    // Create the database directory if needed / 创建数据库目录
    if let Some(dir) = sqlite_parent_dir(&url) {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            tracing::info!("Created data directory: {:?}", dir);
        }
    }

    SqliteStore::connect(&url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to connect document store at {}", url))
}

/// Directory of a file-backed sqlite URL, None for memory databases
fn sqlite_parent_dir(url: &str) -> Option<PathBuf> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Import `<collection>.json` / `<collection>.jsonl` files into empty collections / 导入文档
pub async fn import_documents(store: &SqliteStore, dir: &Path) -> Result<u64> {
    let mut total = 0;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read import directory {:?}", dir))?;

    for entry in entries {
        let path = entry?.path();
        let lines = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => false,
            Some("jsonl") => true,
            _ => continue,
        };
        let Some(collection) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };

        if store.estimated_count(&collection).await? > 0 {
            tracing::debug!("Collection {} already populated, skipping import", collection);
            continue;
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let docs = parse_documents(&content, lines)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        let count = store.insert_many(&collection, &docs).await?;
        tracing::info!("Imported {} document(s) into {}", count, collection);
        total += count;
    }

    Ok(total)
}

/// Parse a JSON array or JSON-lines text into documents; non-objects are skipped
fn parse_documents(content: &str, lines: bool) -> Result<Vec<Document>> {
    let values: Vec<Value> = if lines {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<Value>, serde_json::Error>>()?
    } else {
        serde_json::from_str(content)?
    };

    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}
