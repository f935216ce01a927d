//! Enumerated render modes carried by `Mode` properties
//!
//! Each mode is stored on the wire as a `u8` ordinal in the order the HX
//! runtime declares the constants.

use serde::{Deserialize, Serialize};

use super::types::PropertyValue;

macro_rules! mode_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            /// Every variant, in wire order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Number of variants; the exclusive upper bound of the wire ordinal.
            pub const COUNT: u8 = Self::ALL.len() as u8;
        }

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(mode: $name) -> u8 {
                mode as u8
            }
        }

        impl From<$name> for PropertyValue {
            fn from(mode: $name) -> PropertyValue {
                PropertyValue::Mode(mode as u8)
            }
        }
    };
}

mode_enum! {
    /// Scene lighting setup (header LIGHTING_MODE).
    LightingMode { Off = 0, Fixed = 1, Dynamic = 2 }
}

mode_enum! {
    /// Primitive topology of a mesh (ELEMENT_TYPE).
    ElementType {
        Points = 0,
        Lines = 1,
        LineStrip = 2,
        LineLoop = 3,
        Triangles = 4,
        TriangleStrip = 5,
        TriangleFan = 6,
    }
}

mode_enum! {
    TextureWrapMode { Repeat = 0, Clamp = 1 }
}

mode_enum! {
    TextureFilter {
        Nearest = 0,
        Bilinear = 1,
        Trilinear = 2,
        TrilinearAnisotropic = 3,
        NearestNoMip = 4,
        BilinearNoMip = 5,
    }
}

mode_enum! {
    /// How the specular map channels are interpreted.
    SpecularMapMode {
        Roughness = 0,
        RoughnessMetallic = 1,
        RoughnessMetallicReflectance = 2,
        ShareNormalMap = 3,
    }
}

mode_enum! {
    LightingModel { Unlit = 0, BlinnPhong = 1, Lambert = 2, Ggx = 3, GgxFull = 4 }
}

mode_enum! {
    /// Faces culled when rendering a material.
    CullMode { None = 0, Back = 1, Front = 2, All = 3 }
}

mode_enum! {
    BlendFactor {
        Zero = 0,
        One = 1,
        SourceColor = 2,
        OneMinusSourceColor = 3,
        DestinationColor = 4,
        OneMinusDestinationColor = 5,
        SourceAlpha = 6,
        OneMinusSourceAlpha = 7,
        DestinationAlpha = 8,
        OneMinusDestinationAlpha = 9,
        SourceAlphaSaturate = 10,
        ConstantAlpha = 11,
        OneMinusConstantAlpha = 12,
    }
}

mode_enum! {
    BlendOperator { Add = 0, Subtract = 1, ReverseSubtract = 2 }
}
