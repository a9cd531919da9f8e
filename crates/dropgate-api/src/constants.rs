//! HTTP-level constants shared by handlers and routes.

/// Upload endpoint path
pub const UPLOAD_PATH: &str = "/upload";

/// Header carrying the client's Turnstile token
pub const TURNSTILE_TOKEN_HEADER: &str = "x-turnstile-token";

/// Placeholder in `public/index.html` replaced by the configured site key
pub const SITE_KEY_PLACEHOLDER: &str = "{{SITE_KEY}}";
