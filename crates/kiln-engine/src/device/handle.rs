use std::fmt;
use std::num::NonZeroU32;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            #[inline]
            pub const fn new(raw: NonZeroU32) -> Self {
                Self(raw)
            }

            /// Builds a handle from a raw GPU name. Zero is never a valid name.
            #[inline]
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            #[inline]
            pub const fn get(self) -> u32 {
                self.0.get()
            }

            #[inline]
            pub(crate) const fn non_zero(self) -> NonZeroU32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

gpu_handle!(
    /// Linked shader program.
    ProgramId
);
gpu_handle!(
    /// Compiled shader stage, only alive between compile and link.
    ShaderId
);
gpu_handle!(
    /// 2D texture object. Owned by the external texture provider.
    TextureId
);
gpu_handle!(
    /// Vertex array object describing one mesh.
    VertexArrayId
);
gpu_handle!(BufferId);

/// Location of a named uniform inside one linked program.
///
/// Unlike object names, location `0` is valid; a missing uniform is
/// represented as `None` by the backend rather than GL's `-1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(u32);

impl UniformLocation {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}
