/// Protocol version sent in every `Tus-Resumable` request header.
pub const TUS_VERSION: &str = "1.0.0";

/// Protocol version header, required on every request and response.
pub const TUS_RESUMABLE: &str = "Tus-Resumable";

/// Comma-separated versions a server supports, sent alongside a 412.
pub const TUS_VERSION_HEADER: &str = "Tus-Version";

/// Byte offset of the upload; sent with PATCH, returned by HEAD and PATCH.
pub const UPLOAD_OFFSET: &str = "Upload-Offset";

/// Total size of the upload in bytes.
pub const UPLOAD_LENGTH: &str = "Upload-Length";

/// Sent instead of `Upload-Length` when the size is not known at creation.
pub const UPLOAD_DEFER_LENGTH: &str = "Upload-Defer-Length";

/// Comma-separated `key base64value` pairs attached at creation.
pub const UPLOAD_METADATA: &str = "Upload-Metadata";

/// Upload URL returned by the creation request.
pub const LOCATION: &str = "Location";

pub const CONTENT_TYPE: &str = "Content-Type";

/// Lets a PATCH travel as POST through proxies that drop unknown methods.
pub const X_HTTP_METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";

/// Content type required for PATCH bodies.
///
/// Deliberately distinct from `application/octet-stream` so servers can
/// reject requests that were not built for this protocol.
pub const OFFSET_OCTET_STREAM: &str = "application/offset+octet-stream";

/// Status a server returns when it does not support the requested version.
pub const STATUS_PRECONDITION_FAILED: u16 = 412;
