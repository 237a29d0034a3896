// src/services/file_storage.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::common::error::AppError;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
    pub size: i64,
}

/// Onde os binários das fotos moram. O banco só guarda o nome e a URL.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, AppError>;

    // Remover um arquivo que já não existe não é erro
    async fn remove(&self, filename: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: "/uploads".to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStorage for LocalDiskStorage {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
        fs::create_dir_all(&self.root).await?;

        let filename = unique_filename(original_name);
        let final_path = self.root.join(&filename);
        let temp_path = self.root.join(format!(".{}.part", filename));

        // Escreve num temporário e renomeia: quem lê nunca vê um arquivo pela metade
        let mut file = fs::File::create(&temp_path).await?;
        if let Err(e) = write_all_synced(&mut file, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        drop(file);
        fs::rename(&temp_path, &final_path).await?;

        tracing::debug!("📁 Arquivo gravado em {}", final_path.display());

        Ok(StoredFile {
            url: format!("{}/{}", self.public_prefix, filename),
            filename,
            size: bytes.len() as i64,
        })
    }

    async fn remove(&self, filename: &str) -> Result<(), AppError> {
        // Nomes vêm do banco, mas nunca deixamos sair da pasta
        let path = self.root.join(sanitize_filename(filename));
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_all_synced(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_all().await
}

// `<millis>-<8 hex>-<nome limpo>`
fn unique_filename(original_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8],
        sanitize_filename(original_name)
    )
}

/// Mantém só `[A-Za-z0-9._-]` do último segmento do caminho.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .take(MAX_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}
