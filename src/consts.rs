//! Fixed-function OpenGL ES 1.x tokens.
//!
//! `gleam::gl` is generated from the core desktop and ES 2/3 registries, so
//! it lacks the fixed-function pipeline's matrix modes, client arrays, and
//! texture environment tokens. The renderer still passes these, so we spell
//! them out here with the values from the GLES 1.1 headers.

use gleam::gl::GLenum;

pub const ADD: GLenum = 0x0104;
pub const LIGHTING: GLenum = 0x0B50;
pub const FOG: GLenum = 0x0B60;
pub const ALPHA_TEST: GLenum = 0x0BC0;
pub const NORMALIZE: GLenum = 0x0BA1;
pub const PERSPECTIVE_CORRECTION_HINT: GLenum = 0x0C50;
pub const MODELVIEW: GLenum = 0x1700;
pub const PROJECTION: GLenum = 0x1701;
pub const TEXTURE: GLenum = 0x1702;
pub const FLAT: GLenum = 0x1D00;
pub const SMOOTH: GLenum = 0x1D01;
pub const MODULATE: GLenum = 0x2100;
pub const DECAL: GLenum = 0x2101;
pub const TEXTURE_ENV_MODE: GLenum = 0x2200;
pub const TEXTURE_ENV: GLenum = 0x2300;
pub const CLIP_PLANE0: GLenum = 0x3000;
pub const CLIP_PLANE1: GLenum = 0x3001;
pub const RESCALE_NORMAL: GLenum = 0x803A;
pub const VERTEX_ARRAY: GLenum = 0x8074;
pub const NORMAL_ARRAY: GLenum = 0x8075;
pub const COLOR_ARRAY: GLenum = 0x8076;
pub const TEXTURE_COORD_ARRAY: GLenum = 0x8078;
pub const CLIENT_ACTIVE_TEXTURE: GLenum = 0x84E1;
pub const MAX_TEXTURE_UNITS: GLenum = 0x84E2;
pub const COMBINE: GLenum = 0x8570;

/// The limare driver's texel format code for 8888 RGBA.
pub const LIMA_TEXEL_FORMAT_RGBA_8888: u32 = 0x16;
