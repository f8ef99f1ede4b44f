use bytes::Bytes;
use uuid::Uuid;

use darzi_core::traits::*;
use darzi_core::{DarziError, DarziResult};

use crate::state::AppState;

/// Store a customer reference image: try the configured external image host
/// first, fall back to the local uploads directory when the host is down or
/// misconfigured. Returns the URL to record on the cart line.
pub async fn store_reference_image<A, P, C, O, I>(
    state: &AppState<A, P, C, O, I>,
    original_name: Option<&str>,
    data: Bytes,
) -> DarziResult<String>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let filename = unique_filename(original_name);

    if let Some(host) = &state.config.uploads.image_host_url {
        match upload_to_host(&state.http_client, host, &filename, data.clone()).await {
            Ok(url) => return Ok(url),
            Err(e) => {
                tracing::warn!("image host upload failed, falling back to local storage: {e}");
            }
        }
    }

    state
        .image_store
        .put_image("reference-images", &filename, data)
        .await
}

/// Product catalog images are only ever stored locally.
pub async fn store_product_image<A, P, C, O, I>(
    state: &AppState<A, P, C, O, I>,
    original_name: Option<&str>,
    data: Bytes,
) -> DarziResult<String>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let filename = unique_filename(original_name);
    state.image_store.put_image("products", &filename, data).await
}

async fn upload_to_host(
    client: &reqwest::Client,
    host: &str,
    filename: &str,
    data: Bytes,
) -> DarziResult<String> {
    let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(host)
        .multipart(form)
        .send()
        .await
        .map_err(|e| DarziError::InternalError(format!("image host unreachable: {e}")))?;

    if !response.status().is_success() {
        return Err(DarziError::InternalError(format!(
            "image host returned status {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| DarziError::InternalError(format!("image host response unreadable: {e}")))?;

    body.get("url")
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .ok_or_else(|| DarziError::InternalError("image host response missing url".to_string()))
}

/// Generate a collision-free filename, keeping the original extension when
/// it looks safe.
fn unique_filename(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_extensions() {
        let name = unique_filename(Some("design photo.JPG"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn drops_suspicious_extensions() {
        assert!(!unique_filename(Some("x.j/../pg")).contains('/'));
        assert!(!unique_filename(Some("noext")).contains('.'));
        assert!(!unique_filename(None).contains('.'));
    }

    #[test]
    fn names_are_unique() {
        assert_ne!(unique_filename(Some("a.png")), unique_filename(Some("a.png")));
    }
}
