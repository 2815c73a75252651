//! Async entry points.
//!
//! Resolution may stat files and read content, so these run it on tokio's
//! blocking pool instead of the calling task.

use crate::byte_source::ByteSource;
use crate::error::Result;
use crate::media_type::MediaType;
use crate::resolver::MediaTypeDetector;
use std::sync::Arc;
use url::Url;

/// [`MediaTypeDetector::detect`] on the blocking pool.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tokio_mediatype::{task, MediaTypeDetector};
/// use url::Url;
///
/// # tokio_test::block_on(async {
/// let detector = Arc::new(MediaTypeDetector::new());
/// let uri = Url::parse("https://example.com/config.yml").unwrap();
/// let media_type = task::detect_async(detector, uri, b"a: 1".to_vec()).await.unwrap();
/// assert_eq!(media_type.to_string(), "application/yaml; charset=UTF-8");
/// # });
/// ```
pub async fn detect_async<B>(
    detector: Arc<MediaTypeDetector>,
    uri: Url,
    bytes: B,
) -> Result<MediaType>
where
    B: ByteSource + 'static,
{
    tokio::task::spawn_blocking(move || detector.detect(&uri, &bytes)).await?
}

/// [`MediaTypeDetector::resolve`] on the blocking pool.
pub async fn resolve_async(
    detector: Arc<MediaTypeDetector>,
    content_type: Option<String>,
    content_encoding: Option<String>,
    uri: Option<Url>,
) -> Result<MediaType> {
    tokio::task::spawn_blocking(move || {
        detector.resolve(content_type.as_deref(), content_encoding.as_deref(), uri.as_ref())
    })
    .await?
}
