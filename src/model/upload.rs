use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}
