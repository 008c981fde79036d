use thiserror::Error;

use crate::factory::errors::CompileError;
use crate::render::errors::RenderError;

/// Top-level error type for template resolution.
///
/// Every variant is a programmer-visible contract violation; there are no
/// transient failure classes in this crate and nothing is retried internally.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
