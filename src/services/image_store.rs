// src/services/image_store.rs
//
// Armazenamento das fotos de avaliação em disco. Os nomes vêm de uuid
// (nunca do cliente) e só extensões de imagem conhecidas passam.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::common::error::AppError;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Extensão normalizada (minúscula) do nome enviado, se for permitida.
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[derive(Clone)]
pub struct ImageStore {
    upload_dir: PathBuf,
}

impl ImageStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self { upload_dir: upload_dir.into() }
    }

    fn review_dir(&self, review_id: i32) -> PathBuf {
        self.upload_dir.join("procurement_reviews").join(review_id.to_string())
    }

    /// Grava os bytes de uma foto e devolve o caminho relativo que vai
    /// para o banco (procurement_reviews/<review_id>/<uuid>.<ext>).
    pub async fn save_review_image(
        &self,
        review_id: i32,
        original_file_name: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let ext = allowed_extension(original_file_name).ok_or_else(|| {
            AppError::invalid("formato de imagem não suportado; use jpg, jpeg, png, webp ou gif")
        })?;

        let dir = self.review_dir(review_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("falha ao criar diretório de upload: {e}"))?;

        let file_name = format!("{}.{ext}", Uuid::new_v4().simple());
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| anyhow::anyhow!("falha ao gravar imagem: {e}"))?;

        Ok(format!("procurement_reviews/{review_id}/{file_name}"))
    }

    pub fn resolve(&self, relative_path: &str) -> PathBuf {
        self.upload_dir.join(relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_case_insensitive() {
        assert_eq!(allowed_extension("foto.jpg").as_deref(), Some("jpg"));
        assert_eq!(allowed_extension("foto.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("a.b.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("x.webp").as_deref(), Some("webp"));
        assert_eq!(allowed_extension("x.gif").as_deref(), Some("gif"));
    }

    #[test]
    fn rejects_unknown_or_missing_extensions() {
        assert!(allowed_extension("script.exe").is_none());
        assert!(allowed_extension("documento.pdf").is_none());
        assert!(allowed_extension("sem_extensao").is_none());
        assert!(allowed_extension(".jpg").is_none()); // só a extensão, sem nome
    }
}
