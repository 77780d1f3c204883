/* src/server/adapter/axum/src/handler/statics.rs */

// Worlds and stored assets are content-addressed or versioned by path,
// so they are served with one-year immutable caching.

use std::path::Path;

use axum::Router;
use axum::http::{HeaderValue, Response, header};
use tower_http::services::ServeDir;
use tower_http::services::fs::ServeFileSystemResponseBody;
use tower_http::set_header::SetResponseHeader;

pub(crate) const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

const ONE_YEAR_SECS: i64 = 31_536_000;

/// `Expires` for older caches, one year from the moment of the response.
fn expires_header(_: &Response<ServeFileSystemResponseBody>) -> Option<HeaderValue> {
  let at = chrono::Utc::now() + chrono::TimeDelta::seconds(ONE_YEAR_SECS);
  HeaderValue::from_str(&at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()).ok()
}

/// Serve `dir` under `prefix` with immutable caching headers.
pub(super) fn nest_immutable<S>(router: Router<S>, prefix: &str, dir: &Path) -> Router<S>
where
  S: Clone + Send + Sync + 'static,
{
  let files = SetResponseHeader::overriding(
    ServeDir::new(dir),
    header::CACHE_CONTROL,
    HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
  );
  let files = SetResponseHeader::overriding(
    files,
    header::EXPIRES,
    expires_header as fn(&Response<ServeFileSystemResponseBody>) -> Option<HeaderValue>,
  );
  router.nest_service(prefix, files)
}
