//! Response caching middleware for the player listing endpoint.
//!
//! GET requests whose path contains the listing segment are served from the
//! shared [`ResponseCache`] when an unexpired entry exists; otherwise the
//! downstream handler runs and a 200 response has its body buffered and
//! stored before being returned. Mutating requests pass through untouched in
//! both directions and do not invalidate entries, so a PUT can leave a stale
//! listing cached for up to the TTL.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::cache::{CachedResponse, ResponseCache};

/// Path segment identifying the paginated player collection.
const LISTING_SEGMENT: &str = "/players";

/// A request is cacheable only if it is a read and targets the listing.
fn is_cacheable(method: &Method, path: &str) -> bool {
    method == Method::GET && path.contains(LISTING_SEGMENT)
}

/// Cache key: request path plus query string.
///
/// The query string matters — `page=1` and `page=2` are different payloads
/// and keying on the path alone would serve whichever page was cached first
/// to every caller.
fn cache_key(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    }
}

/// Wrap a cached payload in a fresh response envelope.
///
/// Only the content type is carried over from the original response; any
/// other headers the downstream handler set are not replayed.
fn serve_cached(cached: CachedResponse) -> Response {
    let mut response = Response::new(Body::from(cached.body));
    if let Some(content_type) = cached
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
pub async fn respond_from_cache(
    State(cache): State<Arc<ResponseCache>>,
    request: Request,
    next: Next,
) -> Response {
    let cacheable = is_cacheable(request.method(), request.uri().path());
    let key = cache_key(request.uri());

    if cacheable {
        if let Some(cached) = cache.get(&key) {
            debug!(key = %key, "Serving cached response");
            return serve_cached(cached);
        }
    }

    let response = next.run(request).await;

    if !cacheable || response.status() != StatusCode::OK {
        return response;
    }

    // Buffer the complete body before caching. A streamed body must never be
    // stored as a live handle: the first reader would drain it and later
    // hits would observe a truncated or empty payload.
    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let content_type = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            cache.insert(key, bytes.clone(), content_type);
            // The first caller gets the downstream response rebuilt around
            // the buffered bytes, original status and headers intact.
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            warn!("Failed to buffer response body for caching: {}", e);
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
    use axum::http::header::HeaderName;
    use axum::routing::{get, put};
    use axum::{middleware, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::util::ServiceExt;

    /// Router whose listing handler counts invocations and echoes the count.
    fn test_app(cache: Arc<ResponseCache>) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let listing_calls = calls.clone();
        let app = Router::new()
            .route(
                "/players",
                get(move || {
                    let calls = listing_calls.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        (
                            [
                                (CONTENT_TYPE, "application/json"),
                                (HeaderName::from_static("x-handler-call"), "yes"),
                            ],
                            format!("{{\"call\":{n}}}"),
                        )
                    }
                }),
            )
            .route(
                "/players/:id",
                put(|| async { (StatusCode::OK, "updated") }),
            )
            .route("/missing/players", get(|| async { StatusCode::NOT_FOUND }))
            .layer(middleware::from_fn_with_state(cache, respond_from_cache));
        (app, calls)
    }

    async fn get_body(app: &Router, uri: &str) -> (StatusCode, Response) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        (response.status(), response)
    }

    async fn body_bytes(response: Response) -> bytes::Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn test_eligibility_predicate() {
        assert!(is_cacheable(&Method::GET, "/players"));
        assert!(is_cacheable(&Method::GET, "/api/players/all"));
        assert!(!is_cacheable(&Method::PUT, "/players"));
        assert!(!is_cacheable(&Method::GET, "/"));
        assert!(!is_cacheable(&Method::GET, "/player/42/description"));
    }

    #[test]
    fn test_cache_key_includes_query() {
        let uri: Uri = "/players?page=2&page_size=10".parse().unwrap();
        assert_eq!(cache_key(&uri), "/players?page=2&page_size=10");

        let bare: Uri = "/players".parse().unwrap();
        assert_eq!(cache_key(&bare), "/players");
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, calls) = test_app(cache);

        let (status, first) = get_body(&app, "/players?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let first_bytes = body_bytes(first).await;

        let (status, second) = get_body(&app, "/players?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let second_bytes = body_bytes(second).await;

        assert_eq!(first_bytes, second_bytes, "hit returns the stored bytes verbatim");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "downstream ran once");
    }

    #[tokio::test]
    async fn test_distinct_queries_are_distinct_entries() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, calls) = test_app(cache);

        let (_, page1) = get_body(&app, "/players?page=1").await;
        let (_, page2) = get_body(&app, "/players?page=2").await;
        assert_ne!(body_bytes(page1).await, body_bytes(page2).await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Both entries now serve hits
        let (_, again) = get_body(&app, "/players?page=2").await;
        let _ = body_bytes(again).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_envelope_drops_extra_headers() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, _) = test_app(cache);

        // Populate pass keeps the downstream headers
        let (_, first) = get_body(&app, "/players").await;
        assert!(first.headers().contains_key("x-handler-call"));

        // Hit pass serves a fresh envelope with only the content type
        let (_, second) = get_body(&app, "/players").await;
        assert!(!second.headers().contains_key("x-handler-call"));
        assert_eq!(
            second.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_put_bypasses_cache() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, _) = test_app(cache.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/players/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cache.is_empty(), "mutations are never cached");
    }

    #[tokio::test]
    async fn test_mutation_does_not_invalidate_listing() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, calls) = test_app(cache);

        let (_, first) = get_body(&app, "/players").await;
        let cached = body_bytes(first).await;

        let _ = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/players/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // The stale entry is still served after the mutation
        let (_, second) = get_body(&app, "/players").await;
        assert_eq!(body_bytes(second).await, cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_200_not_cached() {
        let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));
        let (app, _) = test_app(cache.clone());

        let (status, _) = get_body(&app, "/missing/players").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_reinvokes_downstream() {
        let cache = Arc::new(ResponseCache::new(0, DEFAULT_MAX_ENTRIES));
        let (app, calls) = test_app(cache);

        let (_, first) = get_body(&app, "/players").await;
        let _ = body_bytes(first).await;

        // TTL of zero expires an entry as soon as the clock ticks over
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let (_, second) = get_body(&app, "/players").await;
        let _ = body_bytes(second).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2, "expired entry not reused");
    }
}
