//! Embedded GLSL sources.
//!
//! These are build artifacts: a compile or link failure here is a defect in
//! the crate, not a runtime condition.

/// Vertex stage for [`Primitive`](crate::primitive::Primitive).
///
/// The model matrix order `translate * rotate * scale * anchor * size` must
/// match [`MatrixSet::model`](crate::primitive::MatrixSet::model).
pub const PRIMITIVE_VERTEX: &str = r#"#version 410 core

uniform mat4 mProjection;
uniform mat4 mTranslate;
uniform mat4 mRotation;
uniform mat4 mScale;
uniform mat4 mAnchor;
uniform mat4 mSize;

layout(location = 0) in vec2 vertex;
layout(location = 1) in vec2 uv;

out vec2 uv_out;

void main() {
    mat4 mModel = mTranslate * mRotation * mScale * mAnchor * mSize;
    gl_Position = mProjection * mModel * vec4(vertex, 0.0, 1.0);
    uv_out = uv;
}
"#;

/// Fills with the `color` uniform.
pub const SOLID_COLOR_FRAGMENT: &str = r#"#version 410 core

in vec2 uv_out;
out vec4 out_color;

uniform vec4 color;

void main() {
    out_color = color;
}
"#;

/// Samples `tex`; texels that are not fully opaque are discarded so the depth
/// buffer only records solid pixels.
pub const TEXTURE_FRAGMENT: &str = r#"#version 410 core

in vec2 uv_out;
out vec4 out_color;

uniform sampler2D tex;

void main() {
    vec4 texel = texture(tex, uv_out);
    if (texel.a != 1.0) {
        discard;
    }
    out_color = texel;
}
"#;
