//! Turning numeric GL tokens back into the names used in C source.
//!
//! The recorder writes C, so wherever the renderer passed an enum we'd like
//! the dump to say `GL_SRC_ALPHA` rather than `0x0302`. The table below is
//! searched in order and the first entry with a matching value wins.
//!
//! Several tokens share a numeric value (`GL_POINTS`, `GL_ZERO` and
//! `GL_NO_ERROR` are all zero; `GL_LINES` and `GL_ONE` are both one). A
//! lookup can't know which one the caller meant, so don't expect
//! `symbolize` to round-trip names. Which alias comes first is simply the
//! order of the table.

use gleam::gl::{self, GLbitfield, GLenum};
use std::borrow::Cow;

use crate::consts;

macro_rules! table {
    ( $( $module:ident :: $name:ident ),* $(,)? ) => {
        &[
            $( ($module :: $name, concat!("GL_", stringify!($name))), )*
        ]
    }
}

/// Every token we know how to name, in lookup order.
#[rustfmt::skip]
static TABLE: &[(GLenum, &str)] = table![
    // Primitive types. These alias the blend factors and error codes below.
    gl::POINTS, gl::LINES, gl::LINE_LOOP, gl::LINE_STRIP,
    gl::TRIANGLES, gl::TRIANGLE_STRIP, gl::TRIANGLE_FAN,

    // Blend factors.
    gl::ZERO, gl::ONE,
    gl::SRC_COLOR, gl::ONE_MINUS_SRC_COLOR, gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA,
    gl::DST_ALPHA, gl::ONE_MINUS_DST_ALPHA, gl::DST_COLOR, gl::ONE_MINUS_DST_COLOR,
    gl::SRC_ALPHA_SATURATE,

    // Errors.
    gl::NO_ERROR, gl::INVALID_ENUM, gl::INVALID_VALUE, gl::INVALID_OPERATION,
    gl::OUT_OF_MEMORY,

    // Comparison functions.
    gl::NEVER, gl::LESS, gl::EQUAL, gl::LEQUAL, gl::GREATER, gl::NOTEQUAL,
    gl::GEQUAL, gl::ALWAYS,

    // Faces.
    gl::FRONT, gl::BACK, gl::FRONT_AND_BACK, gl::CW, gl::CCW,

    // Capabilities.
    gl::CULL_FACE, consts::LIGHTING, consts::FOG, gl::DEPTH_TEST, gl::STENCIL_TEST,
    consts::NORMALIZE, consts::ALPHA_TEST, gl::DITHER, gl::BLEND, gl::SCISSOR_TEST,
    gl::TEXTURE_2D, gl::POLYGON_OFFSET_FILL, consts::RESCALE_NORMAL,
    gl::SAMPLE_ALPHA_TO_COVERAGE, gl::SAMPLE_COVERAGE,
    consts::CLIP_PLANE0, consts::CLIP_PLANE1,

    // Hints.
    consts::PERSPECTIVE_CORRECTION_HINT, gl::GENERATE_MIPMAP_HINT,
    gl::DONT_CARE, gl::FASTEST, gl::NICEST,

    // Data types.
    gl::BYTE, gl::UNSIGNED_BYTE, gl::SHORT, gl::UNSIGNED_SHORT, gl::INT,
    gl::UNSIGNED_INT, gl::FLOAT, gl::FIXED,

    // Stencil operations. `GL_INVERT` is also a logic op.
    gl::KEEP, gl::REPLACE, gl::INCR, gl::DECR, gl::INVERT,

    // Queries.
    gl::VENDOR, gl::RENDERER, gl::VERSION, gl::EXTENSIONS,
    gl::MAX_TEXTURE_SIZE, consts::MAX_TEXTURE_UNITS,
    gl::UNPACK_ALIGNMENT, gl::PACK_ALIGNMENT,

    // Matrices.
    consts::MODELVIEW, consts::PROJECTION, consts::TEXTURE,

    // Pixel formats.
    gl::DEPTH_COMPONENT, gl::ALPHA, gl::RGB, gl::RGBA, gl::LUMINANCE,
    gl::LUMINANCE_ALPHA,
    gl::UNSIGNED_SHORT_4_4_4_4, gl::UNSIGNED_SHORT_5_5_5_1, gl::UNSIGNED_SHORT_5_6_5,

    // Shading.
    consts::FLAT, consts::SMOOTH,

    // Texture environment.
    consts::ADD, consts::MODULATE, consts::DECAL, consts::TEXTURE_ENV_MODE,
    consts::TEXTURE_ENV, consts::COMBINE,

    // Texture parameters.
    gl::NEAREST, gl::LINEAR, gl::NEAREST_MIPMAP_NEAREST, gl::LINEAR_MIPMAP_NEAREST,
    gl::NEAREST_MIPMAP_LINEAR, gl::LINEAR_MIPMAP_LINEAR,
    gl::TEXTURE_MAG_FILTER, gl::TEXTURE_MIN_FILTER, gl::TEXTURE_WRAP_S,
    gl::TEXTURE_WRAP_T, gl::REPEAT, gl::CLAMP_TO_EDGE, gl::MIRRORED_REPEAT,

    // Texture units.
    gl::TEXTURE0, gl::TEXTURE1, gl::TEXTURE2, gl::TEXTURE3,
    consts::CLIENT_ACTIVE_TEXTURE,

    // Client arrays.
    consts::VERTEX_ARRAY, consts::NORMAL_ARRAY, consts::COLOR_ARRAY,
    consts::TEXTURE_COORD_ARRAY,
];

/// Bits that may appear in a `glClear` mask, in the order we print them.
static CLEAR_BITS: &[(GLbitfield, &str)] = table![
    gl::COLOR_BUFFER_BIT, gl::DEPTH_BUFFER_BIT, gl::STENCIL_BUFFER_BIT,
];

/// Return the source-level name of `value`, if we know one.
pub fn symbolize(value: GLenum) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|&&(candidate, _)| candidate == value)
        .map(|&(_, name)| name)
}

/// Return a C expression for `value`: its name if we know it, or a hex
/// literal otherwise.
pub fn enum_name(value: GLenum) -> Cow<'static, str> {
    match symbolize(value) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("0x{:04X}", value)),
    }
}

/// Return a C expression for a `glClear` mask, like
/// `GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT`.
///
/// Bits we don't recognize are collected into a trailing hex literal.
pub fn bitfield_name(mask: GLbitfield) -> String {
    let mut parts = vec![];
    let mut rest = mask;
    for &(bit, name) in CLEAR_BITS {
        if mask & bit != 0 {
            parts.push(Cow::Borrowed(name));
            rest &= !bit;
        }
    }
    if rest != 0 || parts.is_empty() {
        parts.push(Cow::Owned(format!("0x{:04X}", rest)));
    }
    parts.join(" | ")
}

#[test]
fn test_symbolize() {
    assert_eq!(symbolize(gl::SRC_ALPHA), Some("GL_SRC_ALPHA"));
    assert_eq!(symbolize(consts::TEXTURE_COORD_ARRAY), Some("GL_TEXTURE_COORD_ARRAY"));
    assert_eq!(symbolize(gl::TEXTURE1), Some("GL_TEXTURE1"));
    assert_eq!(symbolize(0xdead), None);

    // Lookups are pure.
    for &(value, _) in TABLE {
        assert_eq!(symbolize(value), symbolize(value));
    }
}

#[test]
fn test_aliases_take_first_entry() {
    // `GL_POINTS`, `GL_ZERO` and `GL_NO_ERROR` are all zero.
    assert_eq!(symbolize(0), Some("GL_POINTS"));
    assert_eq!(symbolize(1), Some("GL_LINES"));

    // Every name in the table is either found, or shadowed by an earlier
    // entry with the same value.
    for (i, &(value, name)) in TABLE.iter().enumerate() {
        let found = symbolize(value).unwrap();
        if found != name {
            assert!(TABLE[..i].iter().any(|&(v, n)| v == value && n == found));
        }
    }
}

#[test]
fn test_enum_name_fallback() {
    assert_eq!(enum_name(gl::TRIANGLES), "GL_TRIANGLES");
    assert_eq!(enum_name(0x1234_5), "0x12345");
    assert_eq!(enum_name(0xbeef), "0xBEEF");
}

#[test]
fn test_bitfield_name() {
    assert_eq!(bitfield_name(gl::DEPTH_BUFFER_BIT), "GL_DEPTH_BUFFER_BIT");
    assert_eq!(
        bitfield_name(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT),
        "GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT"
    );
    assert_eq!(bitfield_name(gl::STENCIL_BUFFER_BIT | 0x1), "GL_STENCIL_BUFFER_BIT | 0x0001");
    assert_eq!(bitfield_name(0), "0x0000");
}
