//! A representation for calls forwarded to the graphics driver.

use gleam::gl::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};

/// One call made on a `Backend`, with its parameters.
///
/// Pointers into the renderer's memory are kept as bare addresses: they're
/// only good for checking that the call went through with the same
/// arguments it came in with. Data the driver reads out of slices is kept
/// by value.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
#[rustfmt::skip]
pub enum DriverCall {
    active_texture { texture: GLenum },
    alpha_func { func: GLenum, ref_: GLfloat },
    alpha_func_x { func: GLenum, ref_: GLint },
    bind_texture { target: GLenum, texture: GLuint },
    blend_func { sfactor: GLenum, dfactor: GLenum },
    clear { mask: GLbitfield },
    clear_color { r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat },
    clear_depth_f { depth: GLfloat },
    clear_stencil { s: GLint },
    client_active_texture { texture: GLenum },
    clip_plane_f { plane: GLenum, equation: [GLfloat; 4] },
    color_4f { r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat },
    color_mask { r: bool, g: bool, b: bool, a: bool },
    color_pointer { size: GLint, type_: GLenum, stride: GLsizei, pointer: usize },
    cull_face { mode: GLenum },
    delete_textures { textures: Vec<GLuint> },
    depth_func { func: GLenum },
    depth_mask { flag: bool },
    depth_range_f { near: GLfloat, far: GLfloat },
    disable { cap: GLenum },
    disable_client_state { array: GLenum },
    draw_arrays { mode: GLenum, first: GLint, count: GLsizei },
    draw_elements { mode: GLenum, count: GLsizei, type_: GLenum, indices: usize },
    enable { cap: GLenum },
    enable_client_state { array: GLenum },
    finish,
    flush,
    get_error,
    get_integer_v { name: GLenum },
    get_string { name: GLenum },
    line_width { width: GLfloat },
    load_identity,
    load_matrix_f { m: [GLfloat; 16] },
    material_f { face: GLenum, pname: GLenum, param: GLfloat },
    matrix_mode { mode: GLenum },
    multi_tex_coord_4f { target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat },
    ortho_f { left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat },
    polygon_offset { factor: GLfloat, units: GLfloat },
    pop_matrix,
    push_matrix,
    read_pixels { x: GLint, y: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum },
    scissor { x: GLint, y: GLint, width: GLsizei, height: GLsizei },
    shade_model { mode: GLenum },
    stencil_func { func: GLenum, ref_: GLint, mask: GLuint },
    stencil_mask { mask: GLuint },
    stencil_op { fail: GLenum, zfail: GLenum, zpass: GLenum },
    swap_buffers,
    tex_coord_pointer { size: GLint, type_: GLenum, stride: GLsizei, pointer: usize },
    tex_env_f { target: GLenum, pname: GLenum, param: GLfloat },
    tex_env_i { target: GLenum, pname: GLenum, param: GLint },
    tex_image_2d { target: GLenum, level: GLint, internal_format: GLint, width: GLsizei, height: GLsizei, border: GLint, format: GLenum, type_: GLenum, pixels: Option<Vec<u8>> },
    tex_parameter_i { target: GLenum, pname: GLenum, param: GLint },
    tex_sub_image_2d { target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, pixels: Vec<u8> },
    translate_f { x: GLfloat, y: GLfloat, z: GLfloat },
    vertex_pointer { size: GLint, type_: GLenum, stride: GLsizei, pointer: usize },
    viewport { x: GLint, y: GLint, width: GLsizei, height: GLsizei },
}

impl DriverCall {
    /// The GL entry point this call corresponds to.
    pub fn gl_name(&self) -> &'static str {
        use DriverCall::*;
        match self {
            active_texture { .. } => "glActiveTexture",
            alpha_func { .. } => "glAlphaFunc",
            alpha_func_x { .. } => "glAlphaFuncx",
            bind_texture { .. } => "glBindTexture",
            blend_func { .. } => "glBlendFunc",
            clear { .. } => "glClear",
            clear_color { .. } => "glClearColor",
            clear_depth_f { .. } => "glClearDepthf",
            clear_stencil { .. } => "glClearStencil",
            client_active_texture { .. } => "glClientActiveTexture",
            clip_plane_f { .. } => "glClipPlanef",
            color_4f { .. } => "glColor4f",
            color_mask { .. } => "glColorMask",
            color_pointer { .. } => "glColorPointer",
            cull_face { .. } => "glCullFace",
            delete_textures { .. } => "glDeleteTextures",
            depth_func { .. } => "glDepthFunc",
            depth_mask { .. } => "glDepthMask",
            depth_range_f { .. } => "glDepthRangef",
            disable { .. } => "glDisable",
            disable_client_state { .. } => "glDisableClientState",
            draw_arrays { .. } => "glDrawArrays",
            draw_elements { .. } => "glDrawElements",
            enable { .. } => "glEnable",
            enable_client_state { .. } => "glEnableClientState",
            finish => "glFinish",
            flush => "glFlush",
            get_error => "glGetError",
            get_integer_v { .. } => "glGetIntegerv",
            get_string { .. } => "glGetString",
            line_width { .. } => "glLineWidth",
            load_identity => "glLoadIdentity",
            load_matrix_f { .. } => "glLoadMatrixf",
            material_f { .. } => "glMaterialf",
            matrix_mode { .. } => "glMatrixMode",
            multi_tex_coord_4f { .. } => "glMultiTexCoord4f",
            ortho_f { .. } => "glOrthof",
            polygon_offset { .. } => "glPolygonOffset",
            pop_matrix => "glPopMatrix",
            push_matrix => "glPushMatrix",
            read_pixels { .. } => "glReadPixels",
            scissor { .. } => "glScissor",
            shade_model { .. } => "glShadeModel",
            stencil_func { .. } => "glStencilFunc",
            stencil_mask { .. } => "glStencilMask",
            stencil_op { .. } => "glStencilOp",
            swap_buffers => "eglSwapBuffers",
            tex_coord_pointer { .. } => "glTexCoordPointer",
            tex_env_f { .. } => "glTexEnvf",
            tex_env_i { .. } => "glTexEnvi",
            tex_image_2d { .. } => "glTexImage2D",
            tex_parameter_i { .. } => "glTexParameteri",
            tex_sub_image_2d { .. } => "glTexSubImage2D",
            translate_f { .. } => "glTranslatef",
            vertex_pointer { .. } => "glVertexPointer",
            viewport { .. } => "glViewport",
        }
    }
}

#[test]
fn test_gl_name() {
    assert_eq!(DriverCall::finish.gl_name(), "glFinish");
    assert_eq!(DriverCall::enable { cap: gleam::gl::BLEND }.gl_name(), "glEnable");
    assert_eq!(
        DriverCall::tex_image_2d {
            target: gleam::gl::TEXTURE_2D,
            level: 0,
            internal_format: gleam::gl::RGBA as GLint,
            width: 1,
            height: 1,
            border: 0,
            format: gleam::gl::RGBA,
            type_: gleam::gl::UNSIGNED_BYTE,
            pixels: None,
        }
        .gl_name(),
        "glTexImage2D"
    );
}
