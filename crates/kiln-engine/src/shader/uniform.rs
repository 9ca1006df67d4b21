use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::paint::Color;
use crate::{Error, Result};

/// A value that can be uploaded to a shader uniform.
///
/// The variant picks the upload path; `Color` shares the `vec4` path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Color(Color),
}

impl UniformValue {
    /// Interprets a raw component slice by its length.
    ///
    /// `1..=4` map to scalar and vectors, `9` to `mat3`, `16` to `mat4`
    /// (column-major). A `mat2` is indistinguishable from a `vec4` here and
    /// has to be built from [`Mat2`] directly.
    pub fn from_components(components: &[f32]) -> Result<Self> {
        Ok(match components.len() {
            1 => Self::Float(components[0]),
            2 => Self::Vec2(Vec2::from_slice(components)),
            3 => Self::Vec3(Vec3::from_slice(components)),
            4 => Self::Vec4(Vec4::from_slice(components)),
            9 => Self::Mat3(Mat3::from_cols_slice(components)),
            16 => Self::Mat4(Mat4::from_cols_slice(components)),
            n => {
                return Err(Error::UnsupportedUniform(format!("[f32; {n}]")));
            }
        })
    }

    /// GLSL type name, used in diagnostics.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) | Self::Color(_) => "vec4",
            Self::Mat2(_) => "mat2",
            Self::Mat3(_) => "mat3",
            Self::Mat4(_) => "mat4",
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat2> for UniformValue {
    fn from(m: Mat2) -> Self {
        Self::Mat2(m)
    }
}

impl From<Mat3> for UniformValue {
    fn from(m: Mat3) -> Self {
        Self::Mat3(m)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<Color> for UniformValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}
