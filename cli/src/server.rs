use betadrop_core::ota::{encode_uri_component, MANIFEST_CONTENT_TYPE};
use betadrop_core::token::{MAX_TOKEN_LENGTH, MIN_TOKEN_LENGTH};
use betadrop_core::{
    detect_device, generate_ios_install_url, generate_manifest_plist, generate_short_token,
    validate_file_with_limits, ManifestDescriptor, NavigatorHint, Platform, SizeLimits,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use warp::http::StatusCode;
use warp::Filter;
use warp::Reply;

// ============================================================================
// SERVER CONTEXT: shared state for HTTP endpoints
// ============================================================================

pub struct ServerContext {
    /// HTTPS origin devices reach this server on; manifests must be served over HTTPS.
    pub public_base_url: String,
    pub token_length: usize,
    pub limits: SizeLimits,
    pub start_time: Instant,
}

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Deserialize, Debug)]
struct DeviceQuery {
    touch_points: Option<u32>,
}

/// Manifest fields plus the caller's touch-point count, which iPadOS needs
/// to be told apart from a Mac.
#[derive(Deserialize, Debug)]
struct InstallQuery {
    ipa_url: String,
    bundle_id: String,
    version: String,
    title: String,
    icon_url: Option<String>,
    touch_points: Option<u32>,
}

impl InstallQuery {
    fn into_parts(self) -> (ManifestDescriptor, NavigatorHint) {
        let descriptor = ManifestDescriptor {
            ipa_url: self.ipa_url,
            bundle_id: self.bundle_id,
            version: self.version,
            title: self.title,
            icon_url: self.icon_url,
        };
        let hint = NavigatorHint {
            max_touch_points: self.touch_points,
        };
        (descriptor, hint)
    }
}

#[derive(Deserialize, Debug)]
struct ValidateRequest {
    file_name: String,
    file_size: u64,
}

#[derive(Deserialize, Debug)]
struct TokenQuery {
    length: Option<usize>,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    version: String,
    uptime_seconds: u64,
}

// ============================================================================
// SERVER START
// ============================================================================

pub async fn start(port: u16, ctx: Arc<ServerContext>) {
    let ctx_filter = warp::any().map({
        let ctx = ctx.clone();
        move || ctx.clone()
    });

    // 1. Health at /
    let health_route = warp::path::end()
        .and(warp::get())
        .and(ctx_filter.clone())
        .map(|ctx: Arc<ServerContext>| {
            warp::reply::json(&HealthResponse {
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds: ctx.start_time.elapsed().as_secs(),
            })
        })
        .boxed();

    // 2. Device detection from the caller's User-Agent
    let device_route = warp::path!("api" / "device")
        .and(warp::get())
        .and(warp::header::optional::<String>("user-agent"))
        .and(warp::query::<DeviceQuery>())
        .map(|user_agent: Option<String>, query: DeviceQuery| {
            let hint = NavigatorHint {
                max_touch_points: query.touch_points,
            };
            warp::reply::json(&detect_device(
                user_agent.as_deref().unwrap_or_default(),
                Some(&hint),
            ))
        })
        .boxed();

    // 3. Upload pre-check
    let validate_route = warp::path!("api" / "validate")
        .and(warp::post())
        .and(warp::body::json())
        .and(ctx_filter.clone())
        .map(|req: ValidateRequest, ctx: Arc<ServerContext>| {
            warp::reply::json(&validate_file_with_limits(
                &req.file_name,
                req.file_size,
                &ctx.limits,
            ))
        })
        .boxed();

    // 4. Share token
    let token_route = warp::path!("api" / "token")
        .and(warp::get())
        .and(warp::query::<TokenQuery>())
        .and(ctx_filter.clone())
        .map(|query: TokenQuery, ctx: Arc<ServerContext>| {
            match token_length(query.length, ctx.token_length) {
                Ok(length) => warp::reply::json(&TokenResponse {
                    token: generate_short_token(length),
                })
                .into_response(),
                Err(error) => error_reply(StatusCode::BAD_REQUEST, error),
            }
        })
        .boxed();

    // 5. Manifest plist
    let manifest_route = warp::path("manifest.plist")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ManifestDescriptor>())
        .map(|descriptor: ManifestDescriptor| {
            tracing::debug!("Serving manifest for {}", descriptor.bundle_id);
            warp::reply::with_header(
                generate_manifest_plist(&descriptor),
                "content-type",
                MANIFEST_CONTENT_TYPE,
            )
        })
        .boxed();

    // 6. Install redirect
    let install_route = warp::path("install")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("user-agent"))
        .and(warp::query::<InstallQuery>())
        .and(ctx_filter)
        .map(
            |user_agent: Option<String>, query: InstallQuery, ctx: Arc<ServerContext>| {
                let (descriptor, hint) = query.into_parts();
                match install_link(
                    user_agent.as_deref(),
                    Some(&hint),
                    &descriptor,
                    &ctx.public_base_url,
                ) {
                    Ok(link) => warp::reply::with_header(
                        warp::reply::with_status(warp::reply(), StatusCode::FOUND),
                        "location",
                        link,
                    )
                    .into_response(),
                    Err(error) => error_reply(StatusCode::BAD_REQUEST, error),
                }
            },
        )
        .boxed();

    let cors = warp::cors().allow_any_origin();
    let routes = health_route
        .or(device_route)
        .or(validate_route)
        .or(token_route)
        .or(manifest_route)
        .or(install_route)
        .with(cors)
        .boxed();

    tracing::info!("Manifest server listening on 0.0.0.0:{}", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;
}

// ============================================================================
// HELPERS
// ============================================================================

fn error_reply(status: StatusCode, error: String) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse { error }), status).into_response()
}

/// Requested token length, or the configured default.
fn token_length(requested: Option<usize>, default: usize) -> Result<usize, String> {
    let length = requested.unwrap_or(default);
    if (MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(format!(
            "length must be between {} and {}",
            MIN_TOKEN_LENGTH, MAX_TOKEN_LENGTH
        ))
    }
}

/// URL of this server's manifest endpoint for `descriptor`.
pub fn manifest_url(public_base_url: &str, descriptor: &ManifestDescriptor) -> String {
    let mut url = format!(
        "{}/manifest.plist?ipa_url={}&bundle_id={}&version={}&title={}",
        public_base_url.trim_end_matches('/'),
        encode_uri_component(&descriptor.ipa_url),
        encode_uri_component(&descriptor.bundle_id),
        encode_uri_component(&descriptor.version),
        encode_uri_component(&descriptor.title),
    );
    if let Some(icon_url) = &descriptor.icon_url {
        url.push_str("&icon_url=");
        url.push_str(&encode_uri_component(icon_url));
    }
    url
}

/// The itms-services link for an iOS caller; an error for everyone else.
fn install_link(
    user_agent: Option<&str>,
    hint: Option<&NavigatorHint>,
    descriptor: &ManifestDescriptor,
    public_base_url: &str,
) -> Result<String, String> {
    let device = detect_device(user_agent.unwrap_or_default(), hint);
    if !device.can_install(Platform::Ios) {
        tracing::debug!("Refusing OTA install for {} device", device.device_type);
        return Err("OTA installation requires an iOS device".to_string());
    }
    Ok(generate_ios_install_url(&manifest_url(
        public_base_url,
        descriptor,
    )))
}
