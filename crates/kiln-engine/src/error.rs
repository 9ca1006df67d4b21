use crate::device::ShaderStage;

/// Result alias used across the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Developer-facing failures raised by the rendering core.
///
/// None of these are transient: they point at broken shader sources, a
/// misused API, or a GPU that refused an allocation. Hosts decide whether to
/// abort or recover through [`crate::core::FailurePolicy`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("failed to link shader program: {log}")]
    ProgramLink { log: String },

    #[error("shader program needs at least one stage")]
    NoShaderStages,

    #[error("unsupported uniform value shape: {0}")]
    UnsupportedUniform(String),

    #[error("shader program {0} has been released")]
    ProgramReleased(u32),

    #[error("shader program {0} released twice")]
    ProgramAlreadyReleased(u32),

    #[error("regular polygon needs at least 3 segments, got {segments}")]
    DegenerateShape { segments: u32 },

    #[error("GPU allocation failed: {0}")]
    Allocation(String),
}
