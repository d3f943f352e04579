//! The network seam.

use async_trait::async_trait;

use crate::Error;
use crate::request::{Request, Response};

/// Something that can put a request on the wire.
///
/// Any HTTP status counts as a response; only transport failures (DNS,
/// refused connection, timeout, offline) are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
