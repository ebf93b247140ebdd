use crate::config::UploadConfig;
use crate::errors::{bad_request, ApiError, ApiResult};
use crate::model::upload::UploadedImage;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use futures::Stream;
use futures_util::TryStreamExt;
use image::ImageReader;
use std::io;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, info};
use uuid::Uuid;

/// Where uploaded objects live. Keys are relative, slash separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL of the object.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String>;

    /// Removes the object behind `url`. URLs this store did not issue are ignored.
    async fn delete(&self, url: &str) -> Result<()>;

    /// The key of the object behind `url`, if this store issued it.
    fn key_for(&self, url: &str) -> Option<String>;
}

/// Whether `key` is one of `user_id`'s profile images, `public/{user_id}/{file}`.
pub fn is_user_image(key: &str, user_id: &str) -> bool {
    key.strip_prefix("public/")
        .and_then(|rest| rest.strip_prefix(user_id))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|file| !file.is_empty() && file != "." && file != ".." && !file.contains('/'))
}

/// A user may point their photo anywhere outside the store, but inside it
/// only at their own uploads.
pub fn may_use_as_photo(store: &dyn ObjectStore, user_id: &str, url: &str) -> bool {
    match store.key_for(url) {
        Some(key) => is_user_image(&key, user_id),
        None => true,
    }
}

/// Whether replacing `url` as `user_id`'s photo should remove it from the store.
pub fn owns_upload(store: &dyn ObjectStore, user_id: &str, url: &str) -> bool {
    store.key_for(url).is_some_and(|key| is_user_image(&key, user_id))
}

/// Objects on the local disk below `base_path`, served from `base_url`.
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let key = Path::new(key);
        if key.components().any(|c| !matches!(c, Component::Normal(_))) {
            bail!("Invalid object key: {}", key.display());
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Cannot create directory {}", parent.display()))?;
        }
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Cannot write {}", path.display()))?;

        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let Some(key) = self.key_for(url) else {
            debug!("Not a local object, skip deleting: {}", url);
            return Ok(());
        };

        match fs::remove_file(self.path_for(&key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Cannot delete object"),
        }
    }

    fn key_for(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(String::from)
    }
}

pub struct ImageUploadService {
    config: UploadConfig,
    store: Arc<dyn ObjectStore>,
}

impl ImageUploadService {
    pub fn new(config: UploadConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    /// Checks type, size and content of an uploaded profile image, then
    /// stores it as `public/{user_id}/{uuid}.{ext}`.
    pub async fn upload_profile_image(&self, user_id: &str, field: Field<'_>) -> ApiResult<UploadedImage> {
        let content_type = field
            .content_type()
            .map(str::to_lowercase)
            .ok_or_else(|| bad_request("Invalid file type"))?;

        if !self.config.image_types.contains(&content_type) {
            return Err(bad_request("Invalid file type"));
        }

        let bytes = read_limited(field, self.config.max_image_size).await?;
        if bytes.is_empty() {
            return Err(bad_request("No file provided"));
        }

        ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|_| bad_request("Invalid image file"))?
            .decode()
            .map_err(|_| bad_request("Invalid image file"))?;

        let key = format!(
            "public/{}/{}.{}",
            user_id,
            Uuid::new_v4(),
            extension_for(&content_type)
        );
        let size = bytes.len();
        let url = self.store.put(&key, bytes).await?;

        info!("Stored profile image {} ({} bytes)", key, size);
        Ok(UploadedImage { url })
    }
}

/// Reads the whole stream into memory, failing once it grows past `limit` bytes.
async fn read_limited<S, E>(stream: S, limit: u64) -> ApiResult<Vec<u8>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let body_with_io_error = stream.map_err(io::Error::other);
    let body_reader = StreamReader::new(body_with_io_error).take(limit + 1);
    futures::pin_mut!(body_reader);

    let mut bytes = Vec::new();
    body_reader.read_to_end(&mut bytes).await.map_err(|err| {
        match err.downcast::<MultipartError>() {
            Ok(err) => ApiError::MultiPartError(err),
            Err(err) => ApiError::Anyhow(anyhow::Error::from(err).context("Cannot read upload")),
        }
    })?;

    if bytes.len() as u64 > limit {
        return Err(bad_request(&format!(
            "File too large, the limit is {} bytes",
            limit
        )));
    }
    Ok(bytes)
}

fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        other => other.strip_prefix("image/").unwrap_or("bin"),
    }
}
