//! Result type aliases for Palisade.

use crate::PalisadeError;

/// A specialized `Result` type for Palisade operations.
pub type PalisadeResult<T> = Result<T, PalisadeError>;

/// A boxed future returning a `PalisadeResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = PalisadeResult<T>> + Send + 'a>>;
