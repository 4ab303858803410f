use std::fmt;
use std::num::NonZeroU32;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw driver id. Zero is the "no object" sentinel and yields `None`.
            #[inline]
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

gpu_handle!(
    /// Compiled (or compiling) shader stage object.
    ShaderHandle
);
gpu_handle!(
    /// Linked shader program.
    ProgramHandle
);
gpu_handle!(
    /// Vertex-array descriptor: attribute layout plus index buffer binding.
    VertexArrayHandle
);
gpu_handle!(
    /// Vertex or index buffer.
    BufferHandle
);
