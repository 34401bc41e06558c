//! The graphics driver the renderer's calls are forwarded to.
//!
//! `Backend` has one method per fixed-function entry point the renderer
//! uses, plus the two platform services we need: reading driver strings and
//! presenting a frame. Which implementation is behind it (an EGL context, a
//! shader-based emulation, the limare driver) is decided when the platform
//! layer starts up; the interception and recording logic is the same for
//! all of them.
//!
//! This crate doesn't bring up a driver. The embedding platform layer
//! implements `Backend` over its own GL context and hands it to `Qgl`. The
//! implementations here are the ones that need no driver: `Null`, `Trace`,
//! and `Box<dyn Backend>` for choosing one at run time.

use gleam::gl::{self, GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint, GLvoid};
use std::collections::HashMap;

use crate::call::DriverCall;

/// The driver calls `Qgl` forwards to, implemented by the embedder.
pub trait Backend {
    fn active_texture(&mut self, texture: GLenum);
    fn client_active_texture(&mut self, texture: GLenum);
    fn enable(&mut self, cap: GLenum);
    fn disable(&mut self, cap: GLenum);
    fn enable_client_state(&mut self, array: GLenum);
    fn disable_client_state(&mut self, array: GLenum);

    fn color_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid);
    fn tex_coord_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid);
    fn vertex_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid);

    fn bind_texture(&mut self, target: GLenum, texture: GLuint);
    fn delete_textures(&mut self, textures: &[GLuint]);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &[u8],
    );
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_env_f(&mut self, target: GLenum, pname: GLenum, param: GLfloat);
    fn tex_env_i(&mut self, target: GLenum, pname: GLenum, param: GLint);

    /// Draw from the client arrays.
    ///
    /// Safety: `indices` must point to `count` indices of type `type_`, and
    /// every enabled client array must be valid for every vertex they
    /// mention.
    unsafe fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const GLvoid);
    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei);

    fn matrix_mode(&mut self, mode: GLenum);
    fn load_identity(&mut self);
    fn load_matrix_f(&mut self, m: &[GLfloat; 16]);
    fn ortho_f(&mut self, left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat);
    fn translate_f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);

    fn alpha_func(&mut self, func: GLenum, ref_: GLfloat);
    /// `ref_` is 16.16 fixed point.
    fn alpha_func_x(&mut self, func: GLenum, ref_: GLint);
    fn blend_func(&mut self, sfactor: GLenum, dfactor: GLenum);
    fn clear(&mut self, mask: GLbitfield);
    fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn clear_depth_f(&mut self, depth: GLfloat);
    fn clear_stencil(&mut self, s: GLint);
    fn clip_plane_f(&mut self, plane: GLenum, equation: &[GLfloat; 4]);
    fn color_4f(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);
    fn cull_face(&mut self, mode: GLenum);
    fn depth_func(&mut self, func: GLenum);
    fn depth_mask(&mut self, flag: bool);
    fn depth_range_f(&mut self, near: GLfloat, far: GLfloat);
    fn line_width(&mut self, width: GLfloat);
    fn material_f(&mut self, face: GLenum, pname: GLenum, param: GLfloat);
    fn multi_tex_coord_4f(&mut self, target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat);
    fn polygon_offset(&mut self, factor: GLfloat, units: GLfloat);
    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn shade_model(&mut self, mode: GLenum);
    fn stencil_func(&mut self, func: GLenum, ref_: GLint, mask: GLuint);
    fn stencil_mask(&mut self, mask: GLuint);
    fn stencil_op(&mut self, fail: GLenum, zfail: GLenum, zpass: GLenum);
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    fn finish(&mut self);
    fn flush(&mut self);
    fn get_error(&mut self) -> GLenum;
    fn get_integer_v(&mut self, name: GLenum, result: &mut [GLint]);
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    );

    /// Return one of the driver's identification strings, like
    /// `GL_EXTENSIONS`.
    fn get_string(&mut self, name: GLenum) -> String;

    /// True if the driver's extension string lists `extension`.
    fn query_extension(&mut self, extension: &str) -> bool {
        self.get_string(gl::EXTENSIONS)
            .split_whitespace()
            .any(|name| name == extension)
    }

    /// Present the finished frame.
    fn swap_buffers(&mut self);
}

/// A backend with no driver behind it.
///
/// Every call is accepted and ignored. This is enough to record a frame's
/// calls without a GPU.
#[derive(Clone, Debug)]
pub struct Null {
    strings: HashMap<GLenum, String>,
}

impl Default for Null {
    fn default() -> Null {
        let mut strings = HashMap::new();
        strings.insert(gl::VENDOR, "glimp-replay".to_string());
        strings.insert(gl::RENDERER, "null".to_string());
        strings.insert(gl::VERSION, "OpenGL ES-CM 1.1".to_string());
        strings.insert(gl::EXTENSIONS, String::new());
        Null { strings }
    }
}

impl Null {
    pub fn new() -> Null {
        Null::default()
    }

    /// Answer `GL_EXTENSIONS` queries with `extensions`.
    pub fn with_extensions(mut self, extensions: &str) -> Null {
        self.strings.insert(gl::EXTENSIONS, extensions.to_string());
        self
    }
}

#[allow(unused_variables)]
impl Backend for Null {
    fn active_texture(&mut self, texture: GLenum) {}
    fn client_active_texture(&mut self, texture: GLenum) {}
    fn enable(&mut self, cap: GLenum) {}
    fn disable(&mut self, cap: GLenum) {}
    fn enable_client_state(&mut self, array: GLenum) {}
    fn disable_client_state(&mut self, array: GLenum) {}
    fn color_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {}
    fn tex_coord_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {}
    fn vertex_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {}
    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {}
    fn delete_textures(&mut self, textures: &[GLuint]) {}
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: Option<&[u8]>,
    ) {
    }
    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &[u8],
    ) {
    }
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {}
    fn tex_env_f(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {}
    fn tex_env_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {}
    unsafe fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const GLvoid) {}
    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {}
    fn matrix_mode(&mut self, mode: GLenum) {}
    fn load_identity(&mut self) {}
    fn load_matrix_f(&mut self, m: &[GLfloat; 16]) {}
    fn ortho_f(&mut self, left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat) {}
    fn translate_f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {}
    fn push_matrix(&mut self) {}
    fn pop_matrix(&mut self) {}
    fn alpha_func(&mut self, func: GLenum, ref_: GLfloat) {}
    fn alpha_func_x(&mut self, func: GLenum, ref_: GLint) {}
    fn blend_func(&mut self, sfactor: GLenum, dfactor: GLenum) {}
    fn clear(&mut self, mask: GLbitfield) {}
    fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {}
    fn clear_depth_f(&mut self, depth: GLfloat) {}
    fn clear_stencil(&mut self, s: GLint) {}
    fn clip_plane_f(&mut self, plane: GLenum, equation: &[GLfloat; 4]) {}
    fn color_4f(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {}
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {}
    fn cull_face(&mut self, mode: GLenum) {}
    fn depth_func(&mut self, func: GLenum) {}
    fn depth_mask(&mut self, flag: bool) {}
    fn depth_range_f(&mut self, near: GLfloat, far: GLfloat) {}
    fn line_width(&mut self, width: GLfloat) {}
    fn material_f(&mut self, face: GLenum, pname: GLenum, param: GLfloat) {}
    fn multi_tex_coord_4f(&mut self, target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat) {}
    fn polygon_offset(&mut self, factor: GLfloat, units: GLfloat) {}
    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {}
    fn shade_model(&mut self, mode: GLenum) {}
    fn stencil_func(&mut self, func: GLenum, ref_: GLint, mask: GLuint) {}
    fn stencil_mask(&mut self, mask: GLuint) {}
    fn stencil_op(&mut self, fail: GLenum, zfail: GLenum, zpass: GLenum) {}
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {}
    fn finish(&mut self) {}
    fn flush(&mut self) {}
    fn get_error(&mut self) -> GLenum {
        gl::NO_ERROR
    }
    fn get_integer_v(&mut self, name: GLenum, result: &mut [GLint]) {}
    fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) {
    }
    fn get_string(&mut self, name: GLenum) -> String {
        self.strings.get(&name).cloned().unwrap_or_default()
    }
    fn swap_buffers(&mut self) {}
}

/// A `Backend` parameter type as it appears in a `DriverCall`.
///
/// Most parameters appear as themselves. Pointers become addresses, and
/// borrowed data is copied.
trait Parameter {
    type InCall;

    fn to_call(&self) -> Self::InCall;
}

macro_rules! simple_parameter_types {
    ( $( $type:ty ),* ) => {
        $(
            impl Parameter for $type {
                type InCall = Self;
                fn to_call(&self) -> Self {
                    *self
                }
            }
        )*
    }
}

simple_parameter_types!(bool, u32, i32, f32, [f32; 4], [f32; 16]);

impl Parameter for *const GLvoid {
    type InCall = usize;

    fn to_call(&self) -> usize {
        *self as usize
    }
}

impl<T: Clone> Parameter for [T] {
    type InCall = Vec<T>;

    fn to_call(&self) -> Vec<T> {
        self.to_vec()
    }
}

impl Parameter for Option<&[u8]> {
    type InCall = Option<Vec<u8>>;

    fn to_call(&self) -> Option<Vec<u8>> {
        self.map(|pixels| pixels.to_vec())
    }
}

/// A backend that keeps a list of every call made on it, and then forwards
/// the call to another backend.
#[derive(Debug, Default)]
pub struct Trace<B> {
    pub inner: B,
    pub calls: Vec<DriverCall>,
}

impl<B> Trace<B> {
    pub fn new(inner: B) -> Trace<B> {
        Trace { inner, calls: vec![] }
    }

    /// Return the calls made so far, leaving the list empty.
    pub fn take_calls(&mut self) -> Vec<DriverCall> {
        std::mem::take(&mut self.calls)
    }
}

/// Record a call with all its parameters, and forward it.
macro_rules! simple {
    ($self:ident . $method:ident ( $( $arg:ident ),* )) => {
        {
            $self.calls.push(DriverCall:: $method { $( $arg: $arg.to_call() ),* });
            $self.inner. $method ( $( $arg ),* )
        }
    }
}

/// Record a call with no parameters, and forward it.
macro_rules! bare {
    ($self:ident . $method:ident ()) => {
        {
            $self.calls.push(DriverCall:: $method);
            $self.inner. $method ()
        }
    }
}

impl<B: Backend> Backend for Trace<B> {
    fn active_texture(&mut self, texture: GLenum) {
        simple!(self.active_texture(texture))
    }
    fn client_active_texture(&mut self, texture: GLenum) {
        simple!(self.client_active_texture(texture))
    }
    fn enable(&mut self, cap: GLenum) {
        simple!(self.enable(cap))
    }
    fn disable(&mut self, cap: GLenum) {
        simple!(self.disable(cap))
    }
    fn enable_client_state(&mut self, array: GLenum) {
        simple!(self.enable_client_state(array))
    }
    fn disable_client_state(&mut self, array: GLenum) {
        simple!(self.disable_client_state(array))
    }
    fn color_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        simple!(self.color_pointer(size, type_, stride, pointer))
    }
    fn tex_coord_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        simple!(self.tex_coord_pointer(size, type_, stride, pointer))
    }
    fn vertex_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        simple!(self.vertex_pointer(size, type_, stride, pointer))
    }
    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        simple!(self.bind_texture(target, texture))
    }
    fn delete_textures(&mut self, textures: &[GLuint]) {
        simple!(self.delete_textures(textures))
    }
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: Option<&[u8]>,
    ) {
        simple!(self.tex_image_2d(target, level, internal_format, width, height, border, format, type_, pixels))
    }
    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &[u8],
    ) {
        simple!(self.tex_sub_image_2d(target, level, xoffset, yoffset, width, height, format, type_, pixels))
    }
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        simple!(self.tex_parameter_i(target, pname, param))
    }
    fn tex_env_f(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        simple!(self.tex_env_f(target, pname, param))
    }
    fn tex_env_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        simple!(self.tex_env_i(target, pname, param))
    }
    unsafe fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const GLvoid) {
        simple!(self.draw_elements(mode, count, type_, indices))
    }
    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        simple!(self.draw_arrays(mode, first, count))
    }
    fn matrix_mode(&mut self, mode: GLenum) {
        simple!(self.matrix_mode(mode))
    }
    fn load_identity(&mut self) {
        bare!(self.load_identity())
    }
    fn load_matrix_f(&mut self, m: &[GLfloat; 16]) {
        simple!(self.load_matrix_f(m))
    }
    fn ortho_f(&mut self, left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat) {
        simple!(self.ortho_f(left, right, bottom, top, near, far))
    }
    fn translate_f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        simple!(self.translate_f(x, y, z))
    }
    fn push_matrix(&mut self) {
        bare!(self.push_matrix())
    }
    fn pop_matrix(&mut self) {
        bare!(self.pop_matrix())
    }
    fn alpha_func(&mut self, func: GLenum, ref_: GLfloat) {
        simple!(self.alpha_func(func, ref_))
    }
    fn alpha_func_x(&mut self, func: GLenum, ref_: GLint) {
        simple!(self.alpha_func_x(func, ref_))
    }
    fn blend_func(&mut self, sfactor: GLenum, dfactor: GLenum) {
        simple!(self.blend_func(sfactor, dfactor))
    }
    fn clear(&mut self, mask: GLbitfield) {
        simple!(self.clear(mask))
    }
    fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        simple!(self.clear_color(r, g, b, a))
    }
    fn clear_depth_f(&mut self, depth: GLfloat) {
        simple!(self.clear_depth_f(depth))
    }
    fn clear_stencil(&mut self, s: GLint) {
        simple!(self.clear_stencil(s))
    }
    fn clip_plane_f(&mut self, plane: GLenum, equation: &[GLfloat; 4]) {
        simple!(self.clip_plane_f(plane, equation))
    }
    fn color_4f(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        simple!(self.color_4f(r, g, b, a))
    }
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        simple!(self.color_mask(r, g, b, a))
    }
    fn cull_face(&mut self, mode: GLenum) {
        simple!(self.cull_face(mode))
    }
    fn depth_func(&mut self, func: GLenum) {
        simple!(self.depth_func(func))
    }
    fn depth_mask(&mut self, flag: bool) {
        simple!(self.depth_mask(flag))
    }
    fn depth_range_f(&mut self, near: GLfloat, far: GLfloat) {
        simple!(self.depth_range_f(near, far))
    }
    fn line_width(&mut self, width: GLfloat) {
        simple!(self.line_width(width))
    }
    fn material_f(&mut self, face: GLenum, pname: GLenum, param: GLfloat) {
        simple!(self.material_f(face, pname, param))
    }
    fn multi_tex_coord_4f(&mut self, target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat) {
        simple!(self.multi_tex_coord_4f(target, s, t, r, q))
    }
    fn polygon_offset(&mut self, factor: GLfloat, units: GLfloat) {
        simple!(self.polygon_offset(factor, units))
    }
    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        simple!(self.scissor(x, y, width, height))
    }
    fn shade_model(&mut self, mode: GLenum) {
        simple!(self.shade_model(mode))
    }
    fn stencil_func(&mut self, func: GLenum, ref_: GLint, mask: GLuint) {
        simple!(self.stencil_func(func, ref_, mask))
    }
    fn stencil_mask(&mut self, mask: GLuint) {
        simple!(self.stencil_mask(mask))
    }
    fn stencil_op(&mut self, fail: GLenum, zfail: GLenum, zpass: GLenum) {
        simple!(self.stencil_op(fail, zfail, zpass))
    }
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        simple!(self.viewport(x, y, width, height))
    }
    fn finish(&mut self) {
        bare!(self.finish())
    }
    fn flush(&mut self) {
        bare!(self.flush())
    }
    fn get_error(&mut self) -> GLenum {
        bare!(self.get_error())
    }
    fn get_integer_v(&mut self, name: GLenum, result: &mut [GLint]) {
        self.calls.push(DriverCall::get_integer_v { name });
        self.inner.get_integer_v(name, result)
    }
    fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) {
        self.calls.push(DriverCall::read_pixels { x, y, width, height, format, type_ });
        self.inner.read_pixels(x, y, width, height, format, type_, pixels)
    }
    fn get_string(&mut self, name: GLenum) -> String {
        simple!(self.get_string(name))
    }
    fn query_extension(&mut self, extension: &str) -> bool {
        self.inner.query_extension(extension)
    }
    fn swap_buffers(&mut self) {
        bare!(self.swap_buffers())
    }
}

/// Forward every method to the boxed backend, so the backend can be chosen
/// at run time.
macro_rules! forward {
    ($self:ident . $method:ident ( $( $arg:ident ),* )) => {
        (**$self). $method ( $( $arg ),* )
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn active_texture(&mut self, texture: GLenum) {
        forward!(self.active_texture(texture))
    }
    fn client_active_texture(&mut self, texture: GLenum) {
        forward!(self.client_active_texture(texture))
    }
    fn enable(&mut self, cap: GLenum) {
        forward!(self.enable(cap))
    }
    fn disable(&mut self, cap: GLenum) {
        forward!(self.disable(cap))
    }
    fn enable_client_state(&mut self, array: GLenum) {
        forward!(self.enable_client_state(array))
    }
    fn disable_client_state(&mut self, array: GLenum) {
        forward!(self.disable_client_state(array))
    }
    fn color_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        forward!(self.color_pointer(size, type_, stride, pointer))
    }
    fn tex_coord_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        forward!(self.tex_coord_pointer(size, type_, stride, pointer))
    }
    fn vertex_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        forward!(self.vertex_pointer(size, type_, stride, pointer))
    }
    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        forward!(self.bind_texture(target, texture))
    }
    fn delete_textures(&mut self, textures: &[GLuint]) {
        forward!(self.delete_textures(textures))
    }
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: Option<&[u8]>,
    ) {
        forward!(self.tex_image_2d(target, level, internal_format, width, height, border, format, type_, pixels))
    }
    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &[u8],
    ) {
        forward!(self.tex_sub_image_2d(target, level, xoffset, yoffset, width, height, format, type_, pixels))
    }
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        forward!(self.tex_parameter_i(target, pname, param))
    }
    fn tex_env_f(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        forward!(self.tex_env_f(target, pname, param))
    }
    fn tex_env_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        forward!(self.tex_env_i(target, pname, param))
    }
    unsafe fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const GLvoid) {
        forward!(self.draw_elements(mode, count, type_, indices))
    }
    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        forward!(self.draw_arrays(mode, first, count))
    }
    fn matrix_mode(&mut self, mode: GLenum) {
        forward!(self.matrix_mode(mode))
    }
    fn load_identity(&mut self) {
        forward!(self.load_identity())
    }
    fn load_matrix_f(&mut self, m: &[GLfloat; 16]) {
        forward!(self.load_matrix_f(m))
    }
    fn ortho_f(&mut self, left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat) {
        forward!(self.ortho_f(left, right, bottom, top, near, far))
    }
    fn translate_f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        forward!(self.translate_f(x, y, z))
    }
    fn push_matrix(&mut self) {
        forward!(self.push_matrix())
    }
    fn pop_matrix(&mut self) {
        forward!(self.pop_matrix())
    }
    fn alpha_func(&mut self, func: GLenum, ref_: GLfloat) {
        forward!(self.alpha_func(func, ref_))
    }
    fn alpha_func_x(&mut self, func: GLenum, ref_: GLint) {
        forward!(self.alpha_func_x(func, ref_))
    }
    fn blend_func(&mut self, sfactor: GLenum, dfactor: GLenum) {
        forward!(self.blend_func(sfactor, dfactor))
    }
    fn clear(&mut self, mask: GLbitfield) {
        forward!(self.clear(mask))
    }
    fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        forward!(self.clear_color(r, g, b, a))
    }
    fn clear_depth_f(&mut self, depth: GLfloat) {
        forward!(self.clear_depth_f(depth))
    }
    fn clear_stencil(&mut self, s: GLint) {
        forward!(self.clear_stencil(s))
    }
    fn clip_plane_f(&mut self, plane: GLenum, equation: &[GLfloat; 4]) {
        forward!(self.clip_plane_f(plane, equation))
    }
    fn color_4f(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        forward!(self.color_4f(r, g, b, a))
    }
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        forward!(self.color_mask(r, g, b, a))
    }
    fn cull_face(&mut self, mode: GLenum) {
        forward!(self.cull_face(mode))
    }
    fn depth_func(&mut self, func: GLenum) {
        forward!(self.depth_func(func))
    }
    fn depth_mask(&mut self, flag: bool) {
        forward!(self.depth_mask(flag))
    }
    fn depth_range_f(&mut self, near: GLfloat, far: GLfloat) {
        forward!(self.depth_range_f(near, far))
    }
    fn line_width(&mut self, width: GLfloat) {
        forward!(self.line_width(width))
    }
    fn material_f(&mut self, face: GLenum, pname: GLenum, param: GLfloat) {
        forward!(self.material_f(face, pname, param))
    }
    fn multi_tex_coord_4f(&mut self, target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat) {
        forward!(self.multi_tex_coord_4f(target, s, t, r, q))
    }
    fn polygon_offset(&mut self, factor: GLfloat, units: GLfloat) {
        forward!(self.polygon_offset(factor, units))
    }
    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        forward!(self.scissor(x, y, width, height))
    }
    fn shade_model(&mut self, mode: GLenum) {
        forward!(self.shade_model(mode))
    }
    fn stencil_func(&mut self, func: GLenum, ref_: GLint, mask: GLuint) {
        forward!(self.stencil_func(func, ref_, mask))
    }
    fn stencil_mask(&mut self, mask: GLuint) {
        forward!(self.stencil_mask(mask))
    }
    fn stencil_op(&mut self, fail: GLenum, zfail: GLenum, zpass: GLenum) {
        forward!(self.stencil_op(fail, zfail, zpass))
    }
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        forward!(self.viewport(x, y, width, height))
    }
    fn finish(&mut self) {
        forward!(self.finish())
    }
    fn flush(&mut self) {
        forward!(self.flush())
    }
    fn get_error(&mut self) -> GLenum {
        forward!(self.get_error())
    }
    fn get_integer_v(&mut self, name: GLenum, result: &mut [GLint]) {
        forward!(self.get_integer_v(name, result))
    }
    fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) {
        forward!(self.read_pixels(x, y, width, height, format, type_, pixels))
    }
    fn get_string(&mut self, name: GLenum) -> String {
        forward!(self.get_string(name))
    }
    fn query_extension(&mut self, extension: &str) -> bool {
        forward!(self.query_extension(extension))
    }
    fn swap_buffers(&mut self) {
        forward!(self.swap_buffers())
    }
}

#[test]
fn test_query_extension() {
    let mut null = Null::new().with_extensions("GL_OES_matrix_palette GL_OES_draw_texture");
    assert!(null.query_extension("GL_OES_draw_texture"));
    assert!(!null.query_extension("GL_OES_draw"));
    assert_eq!(null.get_string(gl::RENDERER), "null");
    assert_eq!(null.get_string(0x1234), "");
}

#[test]
fn test_trace() {
    let mut trace = Trace::new(Null::new());
    let matrix = [1.0; 16];
    let textures = [3, 4];
    {
        let backend: &mut dyn Backend = &mut trace;
        backend.enable(gl::BLEND);
        backend.load_matrix_f(&matrix);
        backend.delete_textures(&textures);
        backend.tex_image_2d(gl::TEXTURE_2D, 0, gl::RGBA as GLint, 1, 1, 0, gl::RGBA, gl::UNSIGNED_BYTE, Some(&[1, 2, 3, 4][..]));
        backend.swap_buffers();
    }
    assert_eq!(
        trace.take_calls(),
        vec![
            DriverCall::enable { cap: gl::BLEND },
            DriverCall::load_matrix_f { m: matrix },
            DriverCall::delete_textures { textures: vec![3, 4] },
            DriverCall::tex_image_2d {
                target: gl::TEXTURE_2D,
                level: 0,
                internal_format: gl::RGBA as GLint,
                width: 1,
                height: 1,
                border: 0,
                format: gl::RGBA,
                type_: gl::UNSIGNED_BYTE,
                pixels: Some(vec![1, 2, 3, 4]),
            },
            DriverCall::swap_buffers,
        ]
    );
    assert!(trace.calls.is_empty());

    // Boxed backends work too.
    let mut boxed: Box<dyn Backend> = Box::new(Trace::new(Null::new()));
    assert_eq!(boxed.get_error(), gl::NO_ERROR);
}
