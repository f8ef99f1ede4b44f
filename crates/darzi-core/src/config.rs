use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DarziConfig {
    pub port: u16,
    pub public_url: String,
    /// Browser origin allowed to send credentialed requests (the storefront).
    #[serde(default)]
    pub cors_origin: Option<String>,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory backing the `/uploads` static route.
    #[serde(default = "default_uploads_path")]
    pub path: String,
    /// Optional external image host; reference images are POSTed here first,
    /// with the local directory as fallback.
    #[serde(default)]
    pub image_host_url: Option<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            path: default_uploads_path(),
            image_host_url: None,
        }
    }
}

fn default_uploads_path() -> String {
    "data/uploads".to_string()
}

impl DarziConfig {
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("DARZI_").split("__"))
            .extract()
    }
}
