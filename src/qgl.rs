//! The `qgl*` entry points the renderer calls instead of GL.
//!
//! Every entry point does three things, in order: update the tracked
//! state, record the call if recording is on, and pass the call to the
//! backend with its arguments untouched. Nothing that goes wrong while
//! recording is allowed to change what the backend sees; problems are
//! reported as diagnostics and the recording of that one call is skipped.
//! The only exception is failing to create a frame's output files, which
//! ends the process: a frame missing some of its files is useless.
//!
//! What gets recorded:
//!
//! - Texture unit selection, texture enables, client array state, array
//!   pointers and texture binds are only tracked. They are summarized into
//!   each recorded draw and texture instead.
//!
//! - Texture uploads are collected and written out once finished. See the
//!   `texture` module.
//!
//! - `glDrawElements` is recorded by `Recorder::draw_elements`.
//!
//! - Everything else is written to the main stream as the equivalent GL
//!   call with symbolic arguments, and where the limare driver has an
//!   equivalent, to the limare stream as well.

use gleam::gl::{self, GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint, GLvoid};
use std::{io, process, slice};

use crate::backend::Backend;
use crate::config::RecordConfig;
use crate::consts;
use crate::diag::{ArrayKind, Diagnostic, Diagnostics, Error};
use crate::dump::{self, hex_float};
use crate::files::{Files, Storage};
use crate::recorder::{Frame, Recorder, Stream};
use crate::state::StateTracker;
use crate::symbol::{self, enum_name};
use crate::texture::{Image, TextureCollector, TextureRecord};

/// All the state behind the entry points.
///
/// The renderer issues GL calls from a single thread, so this is owned
/// outright and passed by reference, never shared.
#[derive(Default)]
pub struct RecorderContext {
    pub state: StateTracker,
    pub textures: TextureCollector,

    /// `None` if we're only passing calls through.
    pub recorder: Option<Recorder>,
    pub diags: Diagnostics,
}

/// The call interceptor: GL entry points that track, record, and forward.
pub struct Qgl<B> {
    backend: B,
    context: RecorderContext,
}

fn boolean(value: bool) -> &'static str {
    if value {
        "GL_TRUE"
    } else {
        "GL_FALSE"
    }
}

/// Log `err` and end the process.
fn fatal(err: Error) -> ! {
    log::error!("{}", err);
    process::exit(1);
}

impl<B: Backend> Qgl<B> {
    /// Pass calls through to `backend`, tracking state but not recording.
    pub fn new(backend: B) -> Qgl<B> {
        Qgl {
            backend,
            context: RecorderContext::default(),
        }
    }

    /// Pass calls through to `backend`, and record them in `storage`.
    pub fn recording(backend: B, storage: Box<dyn Storage>, config: RecordConfig) -> Result<Qgl<B>, Error> {
        let recorder = Recorder::new(storage, config)?;
        let mut qgl = Qgl::new(backend);
        qgl.context.recorder = Some(recorder);
        Ok(qgl)
    }

    /// Record if the environment asks for it, as described for
    /// `RecordConfig::from_env`; otherwise just pass calls through.
    pub fn from_env(backend: B) -> Result<Qgl<B>, Error> {
        match RecordConfig::from_env()? {
            Some(config) => {
                let files = Files::create(&config.directory)?;
                log::info!("recording replay frames to {}", files.dir().display());
                Qgl::recording(backend, Box::new(files), config)
            }
            None => Ok(Qgl::new(backend)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> &StateTracker {
        &self.context.state
    }

    pub fn recorder(&self) -> Option<&Recorder> {
        self.context.recorder.as_ref()
    }

    /// Return the diagnostics reported since the current frame began.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.context.diags.take()
    }

    fn report(&mut self, result: Result<(), Diagnostic>) {
        if let Err(diagnostic) = result {
            self.context.diags.report(diagnostic);
        }
    }

    /// Return the recorder, opening a frame if none is open. Return `None`
    /// if we're not recording.
    fn open_recorder(&mut self) -> Option<&mut Recorder> {
        let recorder = self.context.recorder.as_mut()?;
        if recorder.frame_number().is_none() {
            if let Err(err) = recorder.begin_frame() {
                fatal(err);
            }
            self.context.diags.clear();
        }
        Some(recorder)
    }

    /// Write to the current frame, if we're recording.
    fn record<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Frame) -> io::Result<()>,
    {
        if let Some(recorder) = self.open_recorder() {
            recorder.record(f);
        }
    }

    fn finish_texture(&mut self, record: Option<TextureRecord>) {
        if let Some(record) = record {
            log::debug!("texture {} finished with {} levels", record.id, record.levels.len());
            if let Some(recorder) = self.open_recorder() {
                recorder.finish_texture(&record);
            }
        }
    }

    /// The renderer's `GLimp_EndFrame`: present the frame, and close its
    /// file set.
    pub fn end_frame(&mut self) {
        if let Some(recorder) = self.context.recorder.as_mut() {
            recorder.record(|frame| frame.main(format_args!("\t/* eglSwapBuffers */\n")));
        }
        self.backend.swap_buffers();
        if let Some(recorder) = self.context.recorder.as_mut() {
            if let Err(err) = recorder.end_frame() {
                log::error!("{}", err);
            }
        }
        self.context.diags.clear();
    }

    /// `glDrawBuffer`, which the renderer calls as it starts each frame. We
    /// take this as the start of a new file set, unless the open one is
    /// still unused.
    pub fn draw_buffer(&mut self, mode: GLenum) {
        log::trace!("glDrawBuffer({})", enum_name(mode));
        if let Some(recorder) = self.context.recorder.as_mut() {
            let used = recorder.frame.as_ref().map_or(true, |frame| frame.draw_count > 0);
            if used {
                if let Err(err) = recorder.begin_frame() {
                    fatal(err);
                }
                self.context.diags.clear();
            }
        }
    }

    pub fn active_texture(&mut self, texture: GLenum) {
        let result = self.context.state.active_texture(texture);
        self.report(result);
        self.backend.active_texture(texture);
    }

    pub fn client_active_texture(&mut self, texture: GLenum) {
        let result = self.context.state.client_active_texture(texture);
        self.report(result);
        self.backend.client_active_texture(texture);
    }

    fn set_capability(&mut self, cap: GLenum, enabled: bool) {
        if self.context.state.set_capability(cap, enabled) {
            return;
        }
        let (gl_name, limare_name) = if enabled {
            ("glEnable", "limare_enable")
        } else {
            ("glDisable", "limare_disable")
        };
        self.record(|frame| {
            frame.main(format_args!("\t{}({});\n", gl_name, enum_name(cap)))?;
            frame.limare(format_args!("\t{}(state, {});\n", limare_name, enum_name(cap)))
        });
    }

    pub fn enable(&mut self, cap: GLenum) {
        self.set_capability(cap, true);
        self.backend.enable(cap);
    }

    pub fn disable(&mut self, cap: GLenum) {
        self.set_capability(cap, false);
        self.backend.disable(cap);
    }

    pub fn enable_client_state(&mut self, array: GLenum) {
        let result = self.context.state.set_client_state(array, true);
        self.report(result);
        self.backend.enable_client_state(array);
    }

    pub fn disable_client_state(&mut self, array: GLenum) {
        let result = self.context.state.set_client_state(array, false);
        self.report(result);
        self.backend.disable_client_state(array);
    }

    /// Note where colors come from. `pointer` must stay valid until the
    /// draws that use it have been made.
    pub fn color_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        let result = self.context.state.set_pointer(ArrayKind::Color, size, type_, stride, pointer);
        self.report(result);
        self.backend.color_pointer(size, type_, stride, pointer);
    }

    /// Note where the client-active unit's texture coordinates come from.
    /// `pointer` must stay valid until the next draw.
    pub fn tex_coord_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        let result = self.context.state.set_pointer(ArrayKind::TexCoord, size, type_, stride, pointer);
        self.report(result);
        self.backend.tex_coord_pointer(size, type_, stride, pointer);
    }

    /// Note where vertex positions come from. `pointer` must stay valid
    /// until the draws that use it have been made.
    pub fn vertex_pointer(&mut self, size: GLint, type_: GLenum, stride: GLsizei, pointer: *const GLvoid) {
        let result = self.context.state.set_pointer(ArrayKind::Vertex, size, type_, stride, pointer);
        self.report(result);
        self.backend.vertex_pointer(size, type_, stride, pointer);
    }

    pub fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        if target == gl::TEXTURE_2D {
            let finished = self.context.textures.bind(texture, &mut self.context.diags);
            self.finish_texture(finished);
            self.context.state.bind_texture(texture);
        }
        self.backend.bind_texture(target, texture);
    }

    pub fn delete_textures(&mut self, textures: &[GLuint]) {
        let finished = self.context.textures.delete(textures);
        self.finish_texture(finished);
        if let Some(recorder) = self.context.recorder.as_mut() {
            recorder.forget_textures(textures);
        }

        if !textures.is_empty() {
            let ids: Vec<String> = textures.iter().map(|id| id.to_string()).collect();
            self.record(|frame| {
                frame.main(format_args!(
                    "\t{{\n\t\tGLuint tmp[] = {{ {} }};\n\t\tglDeleteTextures({}, tmp);\n\t}}\n",
                    ids.join(", "),
                    ids.len()
                ))
            });
        }
        self.backend.delete_textures(textures);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tex_image_2d(
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
        if target == gl::TEXTURE_2D {
            let image = Image {
                level,
                internal_format,
                width,
                height,
                format,
                pixel_type: type_,
                pixels,
            };
            let bound = self.context.state.bound_texture();
            let finished = self.context.textures.image(bound, &image, &mut self.context.diags);
            self.finish_texture(finished);
        }
        self.backend
            .tex_image_2d(target, level, internal_format, width, height, border, format, type_, pixels);
    }

    /// Only the call is recorded, not the new texels.
    #[allow(clippy::too_many_arguments)]
    pub fn tex_sub_image_2d(
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
        self.record(|frame| {
            frame.main(format_args!(
                "\t/* glTexSubImage2D({}, {}, {}, {}, {}, {}, {}, {}, ...) */\n",
                enum_name(target),
                level,
                xoffset,
                yoffset,
                width,
                height,
                enum_name(format),
                enum_name(type_)
            ))
        });
        self.backend
            .tex_sub_image_2d(target, level, xoffset, yoffset, width, height, format, type_, pixels);
    }

    pub fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        if target == gl::TEXTURE_2D {
            let bound = self.context.state.bound_texture();
            self.context.textures.parameter(bound, pname, param, &mut self.context.diags);
        }
        self.backend.tex_parameter_i(target, pname, param);
    }

    pub fn tex_env_f(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        // Texture environment modes are enums passed as floats.
        let value = if pname == consts::TEXTURE_ENV_MODE {
            format!("(GLfloat) {}", enum_name(param as GLenum))
        } else {
            hex_float(param)
        };
        self.record(|frame| {
            frame.main(format_args!("\tglTexEnvf({}, {}, {});\n", enum_name(target), enum_name(pname), value))
        });
        self.backend.tex_env_f(target, pname, param);
    }

    pub fn tex_env_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglTexEnvi({}, {}, {});\n",
                enum_name(target),
                enum_name(pname),
                enum_name(param as GLenum)
            ))
        });
        self.backend.tex_env_i(target, pname, param);
    }

    /// Draw `count` indexed vertices from the client arrays.
    ///
    /// Safety: `indices` must point to `count` indices of type `type_`, and
    /// every array pointer passed since the arrays were enabled must be
    /// valid for every vertex they mention.
    pub unsafe fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const GLvoid) {
        if type_ != gl::UNSIGNED_SHORT {
            self.context.diags.report(Diagnostic::UnsupportedIndexType { type_ });
        } else if self.context.recorder.is_some() && !indices.is_null() {
            let index_slice = slice::from_raw_parts(indices as *const u16, count.max(0) as usize);
            if self.open_recorder().is_some() {
                let RecorderContext { state, recorder, diags, .. } = &mut self.context;
                if let Some(recorder) = recorder.as_mut() {
                    recorder.draw_elements(state, mode, index_slice, diags);
                }
            }
        }

        self.backend.draw_elements(mode, count, type_, indices);
        self.context.state.end_draw();
    }

    pub fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record(|frame| {
            frame.main(format_args!("\tglDrawArrays({}, {}, {});\n", enum_name(mode), first, count))
        });
        self.backend.draw_arrays(mode, first, count);
    }

    pub fn matrix_mode(&mut self, mode: GLenum) {
        let result = self.context.state.matrix.matrix_mode(mode);
        self.report(result);
        self.record(|frame| frame.main(format_args!("\tglMatrixMode({});\n", enum_name(mode))));
        self.backend.matrix_mode(mode);
    }

    pub fn load_identity(&mut self) {
        self.context.state.matrix.load_identity();
        self.record(|frame| frame.main(format_args!("\tglLoadIdentity();\n")));
        self.backend.load_identity();
    }

    pub fn load_matrix_f(&mut self, m: &[GLfloat; 16]) {
        self.context.state.matrix.load_matrix();
        self.record(|frame| {
            let id = frame.matrix_count;
            if let Some(out) = frame.out(Stream::Main) {
                writeln!(out, "\tfloat Matrix_{}[16] = {{", id)?;
                dump::write_matrix(out, m)?;
                writeln!(out, "\t}};")?;
                writeln!(out, "\tglLoadMatrixf(Matrix_{});", id)?;
            }
            frame.matrix_count += 1;
            Ok(())
        });
        self.backend.load_matrix_f(m);
    }

    pub fn ortho_f(&mut self, left: GLfloat, right: GLfloat, bottom: GLfloat, top: GLfloat, near: GLfloat, far: GLfloat) {
        let result = self.context.state.matrix.orthof();
        self.report(result);
        if right - left == 0.0 || top - bottom == 0.0 || far - near == 0.0 {
            self.context.diags.report(Diagnostic::DegenerateOrtho);
        }
        self.record(|frame| {
            frame.main(format_args!(
                "\tglOrthof({}, {}, {}, {}, {}, {});\n",
                hex_float(left),
                hex_float(right),
                hex_float(bottom),
                hex_float(top),
                hex_float(near),
                hex_float(far)
            ))
        });
        self.backend.ortho_f(left, right, bottom, top, near, far);
    }

    pub fn translate_f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglTranslatef({}, {}, {});\n",
                hex_float(x),
                hex_float(y),
                hex_float(z)
            ))
        });
        self.backend.translate_f(x, y, z);
    }

    pub fn push_matrix(&mut self) {
        self.record(|frame| frame.main(format_args!("\tglPushMatrix();\n")));
        self.backend.push_matrix();
    }

    pub fn pop_matrix(&mut self) {
        self.record(|frame| frame.main(format_args!("\tglPopMatrix();\n")));
        self.backend.pop_matrix();
    }

    pub fn alpha_func(&mut self, func: GLenum, ref_: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!("\tglAlphaFunc({}, {});\n", enum_name(func), hex_float(ref_)))?;
            frame.limare(format_args!("\tlimare_alpha_func(state, {}, {});\n", enum_name(func), hex_float(ref_)))
        });
        self.backend.alpha_func(func, ref_);
    }

    /// `ref_` is 16.16 fixed point.
    pub fn alpha_func_x(&mut self, func: GLenum, ref_: GLint) {
        let float = ref_ as f32 / 65536.0;
        self.record(|frame| {
            frame.main(format_args!("\tglAlphaFuncx({}, 0x{:X});\n", enum_name(func), ref_))?;
            frame.limare(format_args!("\tlimare_alpha_func(state, {}, {});\n", enum_name(func), hex_float(float)))
        });
        self.backend.alpha_func_x(func, ref_);
    }

    pub fn blend_func(&mut self, sfactor: GLenum, dfactor: GLenum) {
        self.record(|frame| {
            frame.main(format_args!("\tglBlendFunc({}, {});\n", enum_name(sfactor), enum_name(dfactor)))?;
            frame.limare(format_args!(
                "\tlimare_blend_func(state, {}, {});\n",
                enum_name(sfactor),
                enum_name(dfactor)
            ))
        });
        self.backend.blend_func(sfactor, dfactor);
    }

    pub fn clear(&mut self, mask: GLbitfield) {
        self.record(|frame| {
            frame.main(format_args!("\tglClear({});\n", symbol::bitfield_name(mask)))?;
            if mask & gl::DEPTH_BUFFER_BIT != 0 {
                frame.limare(format_args!("\tlimare_depth_buffer_clear(state);\n"))?;
            }
            Ok(())
        });
        self.backend.clear(mask);
    }

    pub fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglClearColor({}, {}, {}, {});\n",
                hex_float(r),
                hex_float(g),
                hex_float(b),
                hex_float(a)
            ))
        });
        self.backend.clear_color(r, g, b, a);
    }

    pub fn clear_depth_f(&mut self, depth: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!("\tglClearDepthf({});\n", hex_float(depth)))?;
            frame.limare(format_args!("\tlimare_depth_clear_depth(state, {});\n", hex_float(depth)))
        });
        self.backend.clear_depth_f(depth);
    }

    pub fn clear_stencil(&mut self, s: GLint) {
        self.record(|frame| frame.main(format_args!("\tglClearStencil({});\n", s)));
        self.backend.clear_stencil(s);
    }

    pub fn clip_plane_f(&mut self, plane: GLenum, equation: &[GLfloat; 4]) {
        let values: Vec<String> = equation.iter().map(|&v| hex_float(v)).collect();
        self.record(|frame| {
            frame.main(format_args!(
                "\t{{\n\t\tGLfloat equation[4] = {{ {} }};\n\t\tglClipPlanef({}, equation);\n\t}}\n",
                values.join(", "),
                enum_name(plane)
            ))
        });
        self.backend.clip_plane_f(plane, equation);
    }

    pub fn color_4f(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglColor4f({}, {}, {}, {});\n",
                hex_float(r),
                hex_float(g),
                hex_float(b),
                hex_float(a)
            ))
        });
        self.backend.color_4f(r, g, b, a);
    }

    pub fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglColorMask({}, {}, {}, {});\n",
                boolean(r),
                boolean(g),
                boolean(b),
                boolean(a)
            ))?;
            frame.limare(format_args!(
                "\tlimare_color_mask(state, {}, {}, {}, {});\n",
                r as u8, g as u8, b as u8, a as u8
            ))
        });
        self.backend.color_mask(r, g, b, a);
    }

    pub fn cull_face(&mut self, mode: GLenum) {
        self.record(|frame| {
            frame.main(format_args!("\tglCullFace({});\n", enum_name(mode)))?;
            frame.limare(format_args!("\tlimare_cullface(state, {});\n", enum_name(mode)))
        });
        self.backend.cull_face(mode);
    }

    pub fn depth_func(&mut self, func: GLenum) {
        self.record(|frame| {
            frame.main(format_args!("\tglDepthFunc({});\n", enum_name(func)))?;
            frame.limare(format_args!("\tlimare_depth_func(state, {});\n", enum_name(func)))
        });
        self.backend.depth_func(func);
    }

    pub fn depth_mask(&mut self, flag: bool) {
        self.record(|frame| {
            frame.main(format_args!("\tglDepthMask({});\n", boolean(flag)))?;
            frame.limare(format_args!("\tlimare_depth_mask(state, {});\n", flag as u8))
        });
        self.backend.depth_mask(flag);
    }

    pub fn depth_range_f(&mut self, near: GLfloat, far: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!("\tglDepthRangef({}, {});\n", hex_float(near), hex_float(far)))?;
            frame.limare(format_args!("\tlimare_depth(state, {}, {});\n", hex_float(near), hex_float(far)))
        });
        self.backend.depth_range_f(near, far);
    }

    pub fn line_width(&mut self, width: GLfloat) {
        self.record(|frame| frame.main(format_args!("\tglLineWidth({});\n", hex_float(width))));
        self.backend.line_width(width);
    }

    pub fn material_f(&mut self, face: GLenum, pname: GLenum, param: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglMaterialf({}, 0x{:04X}, {});\n",
                enum_name(face),
                pname,
                hex_float(param)
            ))
        });
        self.backend.material_f(face, pname, param);
    }

    pub fn multi_tex_coord_4f(&mut self, target: GLenum, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglMultiTexCoord4f({}, {}, {}, {}, {});\n",
                enum_name(target),
                hex_float(s),
                hex_float(t),
                hex_float(r),
                hex_float(q)
            ))
        });
        self.backend.multi_tex_coord_4f(target, s, t, r, q);
    }

    pub fn polygon_offset(&mut self, factor: GLfloat, units: GLfloat) {
        self.record(|frame| {
            frame.main(format_args!("\tglPolygonOffset({}, {});\n", hex_float(factor), hex_float(units)))?;
            frame.limare(format_args!(
                "\tlimare_polygon_offset(state, {}, {});\n",
                hex_float(factor),
                hex_float(units)
            ))
        });
        self.backend.polygon_offset(factor, units);
    }

    pub fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(|frame| {
            frame.main(format_args!("\tglScissor({}, {}, {}, {});\n", x, y, width, height))?;
            frame.limare(format_args!("\tlimare_scissor(state, {}, {}, {}, {});\n", x, y, width, height))
        });
        self.backend.scissor(x, y, width, height);
    }

    pub fn shade_model(&mut self, mode: GLenum) {
        self.record(|frame| frame.main(format_args!("\tglShadeModel({});\n", enum_name(mode))));
        self.backend.shade_model(mode);
    }

    pub fn stencil_func(&mut self, func: GLenum, ref_: GLint, mask: GLuint) {
        self.record(|frame| {
            frame.main(format_args!("\tglStencilFunc({}, {}, 0x{:X});\n", enum_name(func), ref_, mask))
        });
        self.backend.stencil_func(func, ref_, mask);
    }

    pub fn stencil_mask(&mut self, mask: GLuint) {
        self.record(|frame| frame.main(format_args!("\tglStencilMask(0x{:X});\n", mask)));
        self.backend.stencil_mask(mask);
    }

    pub fn stencil_op(&mut self, fail: GLenum, zfail: GLenum, zpass: GLenum) {
        self.record(|frame| {
            frame.main(format_args!(
                "\tglStencilOp({}, {}, {});\n",
                enum_name(fail),
                enum_name(zfail),
                enum_name(zpass)
            ))
        });
        self.backend.stencil_op(fail, zfail, zpass);
    }

    pub fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(|frame| {
            frame.main(format_args!("\tglViewport({}, {}, {}, {});\n", x, y, width, height))?;
            frame.limare(format_args!("\tlimare_viewport(state, {}, {}, {}, {});\n", x, y, width, height))
        });
        self.backend.viewport(x, y, width, height);
    }

    pub fn finish(&mut self) {
        self.record(|frame| frame.main(format_args!("\tglFinish();\n")));
        self.backend.finish();
    }

    pub fn flush(&mut self) {
        self.record(|frame| frame.main(format_args!("\tglFlush();\n")));
        self.backend.flush();
    }

    pub fn get_error(&mut self) -> GLenum {
        self.record(|frame| frame.main(format_args!("\tglGetError();\n")));
        self.backend.get_error()
    }

    pub fn get_integer_v(&mut self, name: GLenum, result: &mut [GLint]) {
        self.record(|frame| frame.main(format_args!("\t/* glGetIntegerv({}) */\n", enum_name(name))));
        self.backend.get_integer_v(name, result);
    }

    pub fn get_string(&mut self, name: GLenum) -> String {
        self.record(|frame| frame.main(format_args!("\t/* glGetString({}) */\n", enum_name(name))));
        self.backend.get_string(name)
    }

    pub fn query_extension(&mut self, extension: &str) -> bool {
        self.backend.query_extension(extension)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) {
        self.record(|frame| {
            frame.main(format_args!(
                "\t/* glReadPixels({}, {}, {}, {}, {}, {}) */\n",
                x,
                y,
                width,
                height,
                enum_name(format),
                enum_name(type_)
            ))
        });
        self.backend.read_pixels(x, y, width, height, format, type_, pixels);
    }

    /// The renderer's vertex count hint. Nothing needs it.
    pub fn num_vertices(&mut self, _count: GLint) {}

    /// Compiled vertex arrays aren't supported; the renderer's hints are
    /// dropped.
    pub fn lock_arrays(&mut self, _first: GLint, _count: GLsizei) {}

    pub fn unlock_arrays(&mut self) {}

    /// Display lists don't exist in GLES; the call is only noted.
    pub fn call_list(&mut self, list: GLuint) {
        self.record(|frame| frame.main(format_args!("\t/* glCallList({}) */\n", list)));
    }

    /// Put a comment in the main stream.
    pub fn log_comment(&mut self, comment: &str) {
        let comment = comment.trim_end().replace("*/", "* /");
        self.record(|frame| frame.main(format_args!("\t/* {} */\n", comment)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Null, Trace};
    use crate::call::DriverCall;
    use crate::files::Memory;
    use crate::recorder::{REPLAY_HEADER, TEXTURE_INDEX};
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use std::process::Command;

    fn recording() -> (Memory, Qgl<Trace<Null>>) {
        let memory = Memory::new();
        let qgl = Qgl::recording(Trace::new(Null::new()), Box::new(memory.clone()), RecordConfig::default()).unwrap();
        (memory, qgl)
    }

    struct Arrays {
        positions: Vec<f32>,
        coords: Vec<f32>,
        colors: Vec<u8>,
    }

    impl Arrays {
        fn new(count: usize) -> Arrays {
            Arrays {
                positions: vec![0.5; count * 4],
                coords: vec![0.25; count * 2],
                colors: vec![0xff; count * 4],
            }
        }
    }

    /// Set up colors and unit 0, the way the renderer does for a simple
    /// textured draw.
    fn set_up_single_texture<B: Backend>(qgl: &mut Qgl<B>, arrays: &Arrays, texture: GLuint) {
        qgl.active_texture(gl::TEXTURE0);
        qgl.enable(gl::TEXTURE_2D);
        qgl.bind_texture(gl::TEXTURE_2D, texture);
        qgl.enable_client_state(consts::COLOR_ARRAY);
        qgl.color_pointer(4, gl::UNSIGNED_BYTE, 0, arrays.colors.as_ptr() as *const GLvoid);
        qgl.client_active_texture(gl::TEXTURE0);
        qgl.enable_client_state(consts::TEXTURE_COORD_ARRAY);
        qgl.tex_coord_pointer(2, gl::FLOAT, 0, arrays.coords.as_ptr() as *const GLvoid);
        qgl.vertex_pointer(3, gl::FLOAT, 16, arrays.positions.as_ptr() as *const GLvoid);
    }

    fn upload<B: Backend>(qgl: &mut Qgl<B>, texture: GLuint) {
        qgl.bind_texture(gl::TEXTURE_2D, texture);
        qgl.tex_image_2d(gl::TEXTURE_2D, 0, gl::RGBA as GLint, 1, 1, 0, gl::RGBA, gl::UNSIGNED_BYTE, Some(&[1, 2, 3, 4][..]));
    }

    #[test]
    fn test_texture_finished_on_bind() {
        let (memory, mut qgl) = recording();
        let base = [0x10_u8; 16];
        let mip = [0x20_u8; 4];

        qgl.bind_texture(gl::TEXTURE_2D, 5);
        qgl.tex_image_2d(gl::TEXTURE_2D, 0, gl::RGBA as GLint, 2, 2, 0, gl::RGBA, gl::UNSIGNED_BYTE, Some(&base[..]));
        qgl.tex_image_2d(gl::TEXTURE_2D, 1, gl::RGBA as GLint, 1, 1, 0, gl::RGBA, gl::UNSIGNED_BYTE, Some(&mip[..]));
        qgl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_NEAREST as GLint);
        assert_eq!(qgl.recorder().unwrap().texture_serial(5), None);

        qgl.bind_texture(gl::TEXTURE_2D, 6);
        assert_eq!(qgl.recorder().unwrap().texture_serial(5), Some(0));
        assert_eq!(qgl.state().bound_texture(), 6);
        assert_eq!(qgl.take_diagnostics(), vec![]);

        let textures = memory.contents("frame_0001_textures.c").unwrap();
        assert_eq!(textures.matches("struct texture Texture_").count(), 1);
        assert!(textures.contains("\t.id = 5,\n"));
        assert!(textures.contains("\t.level_count = 2,\n"));
        assert!(textures.contains("\t.min_filter = GL_LINEAR_MIPMAP_NEAREST,\n"));
        assert!(textures.contains("0x20202020"));

        // The driver saw exactly what the renderer passed.
        let calls = qgl.backend_mut().take_calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], DriverCall::bind_texture { target: gl::TEXTURE_2D, texture: 5 });
        assert_eq!(
            calls[3],
            DriverCall::tex_parameter_i {
                target: gl::TEXTURE_2D,
                pname: gl::TEXTURE_MIN_FILTER,
                param: gl::LINEAR_MIPMAP_NEAREST as GLint,
            }
        );
        assert_eq!(calls[4], DriverCall::bind_texture { target: gl::TEXTURE_2D, texture: 6 });
    }

    #[test]
    fn test_gated_draw_still_reaches_driver() {
        let (memory, mut qgl) = recording();
        let arrays = Arrays::new(4);
        let indices: [u16; 6] = [0, 2, 1, 2, 3, 1];

        upload(&mut qgl, 9);
        set_up_single_texture(&mut qgl, &arrays, 9);
        qgl.disable_client_state(consts::COLOR_ARRAY);
        qgl.backend_mut().take_calls();

        unsafe { qgl.draw_elements(gl::TRIANGLES, 6, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid) };
        assert_eq!(qgl.take_diagnostics(), vec![Diagnostic::MissingColors { draw: 0 }]);
        assert_eq!(
            qgl.backend_mut().take_calls(),
            vec![DriverCall::draw_elements {
                mode: gl::TRIANGLES,
                count: 6,
                type_: gl::UNSIGNED_SHORT,
                indices: indices.as_ptr() as usize,
            }]
        );

        qgl.end_frame();
        let draws = memory.contents("frame_0001_draws.c").unwrap();
        assert!(!draws.contains("Colors_"));
        assert!(!draws.contains("struct draw"));
        assert!(!memory.contents("frame_0001.c").unwrap().contains("Draw_"));
    }

    #[test]
    fn test_draws_and_program_switches() {
        let (memory, mut qgl) = recording();
        let arrays = Arrays::new(4);
        let indices: [u16; 6] = [0, 2, 1, 2, 3, 1];

        qgl.draw_buffer(gl::BACK);
        upload(&mut qgl, 9);
        // Switching away finishes the texture.
        qgl.bind_texture(gl::TEXTURE_2D, 10);
        for _ in 0..2 {
            set_up_single_texture(&mut qgl, &arrays, 9);
            unsafe { qgl.draw_elements(gl::TRIANGLES, 6, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid) };
        }
        assert_eq!(qgl.take_diagnostics(), vec![]);

        // Texture coordinates are forgotten after each draw.
        assert!(qgl.state().units[0].coords.is_none());
        assert!(qgl.state().vertices.is_some());
        qgl.end_frame();

        let main = memory.contents("frame_0001.c").unwrap();
        assert_eq!(main.matches("\tprogram_switch(PROGRAM_SINGLE_TEXTURE);\n").count(), 1);
        assert!(main.contains("\tdraw_single_texture(&Draw_0, &Texture_0);\n"));
        assert!(main.contains("\tdraw_single_texture(&Draw_1, &Texture_0);\n"));
        assert!(main.ends_with("\t/* eglSwapBuffers */\n}\n"));

        let draws = memory.contents("frame_0001_draws.c").unwrap();
        assert!(draws.contains("static const float Vertices_1[4][4] = {\n"));
        assert!(draws.contains("\t.vertex_count = 4,\n"));

        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert!(limare.contains("limare_texture_attach(state, \"uTexture0\", Texture_0.handle);\n"));
        assert_eq!(limare.matches("limare_program_current(").count(), 1);
    }

    #[test]
    fn test_frames_and_texture_index() {
        let (memory, mut qgl) = recording();
        let arrays = Arrays::new(2);
        let indices: [u16; 3] = [0, 1, 1];

        qgl.draw_buffer(gl::BACK);
        upload(&mut qgl, 3);
        qgl.bind_texture(gl::TEXTURE_2D, 0);
        qgl.end_frame();

        // A texture from frame 1 drawn in frame 2 is found through the
        // index.
        qgl.draw_buffer(gl::BACK);
        assert_eq!(qgl.recorder().unwrap().frame_number(), Some(2));
        set_up_single_texture(&mut qgl, &arrays, 3);
        unsafe { qgl.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid) };
        qgl.end_frame();

        assert!(memory.contents("frame_0001_textures.c").unwrap().contains("struct texture Texture_0 = {"));
        assert!(!memory.contents("frame_0002_textures.c").unwrap().contains("Texture_0"));
        assert!(memory.contents(TEXTURE_INDEX).unwrap().contains("extern struct texture Texture_0;\n"));
        let main = memory.contents("frame_0002.c").unwrap();
        assert!(main.contains("#include \"textures.h\"\n"));
        assert!(main.contains("draw_single_texture(&Draw_0, &Texture_0);"));

        // Draw numbering restarts with each frame.
        let header = memory.contents("frame_0002.h").unwrap();
        assert!(header.contains("extern struct draw Draw_0;\n"));
        assert!(!memory.contents("frame_0001.h").unwrap().contains("Draw_"));

        for &stream in Stream::ALL.iter() {
            for frame in 1..=2 {
                let text = memory.contents(&stream.file_name(frame)).unwrap();
                assert!(text.ends_with(&stream.trailer(frame)));
            }
        }

        // Unused frames aren't started over by a second glDrawBuffer.
        qgl.draw_buffer(gl::BACK);
        qgl.draw_buffer(gl::BACK);
        assert_eq!(qgl.recorder().unwrap().frame_number(), Some(3));
    }

    #[test]
    fn test_state_calls_recorded() {
        let (memory, mut qgl) = recording();
        qgl.enable(gl::BLEND);
        qgl.enable(gl::TEXTURE_2D);
        qgl.blend_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
        qgl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        qgl.viewport(0, 0, 640, 480);
        qgl.depth_mask(true);
        qgl.delete_textures(&[4, 5]);
        qgl.log_comment("*** begin 2D ***\n");
        qgl.end_frame();

        let main = memory.contents("frame_0001.c").unwrap();
        let body = &main[main.find("{\n").unwrap() + 2..];
        assert_eq!(
            body,
            "\tglEnable(GL_BLEND);\n\
             \tglBlendFunc(GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA);\n\
             \tglClear(GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT);\n\
             \tglViewport(0, 0, 640, 480);\n\
             \tglDepthMask(GL_TRUE);\n\
             \t{\n\t\tGLuint tmp[] = { 4, 5 };\n\t\tglDeleteTextures(2, tmp);\n\t}\n\
             \t/* *** begin 2D *** */\n\
             \t/* eglSwapBuffers */\n\
             }\n"
        );

        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert!(limare.contains(
            "\tlimare_enable(state, GL_BLEND);\n\
             \tlimare_blend_func(state, GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA);\n\
             \tlimare_depth_buffer_clear(state);\n\
             \tlimare_viewport(state, 0, 0, 640, 480);\n\
             \tlimare_depth_mask(state, 1);\n"
        ));
    }

    #[test]
    fn test_matrices() {
        let (memory, mut qgl) = recording();
        let mut identity = [0.0; 16];
        for i in 0..4 {
            identity[i * 5] = 1.0;
        }

        qgl.matrix_mode(consts::PROJECTION);
        qgl.load_identity();
        qgl.ortho_f(0.0, 640.0, 480.0, 0.0, 0.0, 1.0);
        qgl.matrix_mode(consts::MODELVIEW);
        qgl.load_matrix_f(&identity);
        qgl.load_matrix_f(&identity);
        assert_eq!(qgl.take_diagnostics(), vec![]);

        // An orthographic projection that was never made orthographic.
        qgl.matrix_mode(consts::PROJECTION);
        qgl.load_identity();
        qgl.matrix_mode(consts::MODELVIEW);
        assert_eq!(qgl.take_diagnostics().len(), 1);

        qgl.matrix_mode(consts::PROJECTION);
        qgl.load_identity();
        qgl.ortho_f(0.0, 0.0, 480.0, 0.0, 0.0, 1.0);
        assert_eq!(qgl.take_diagnostics(), vec![Diagnostic::DegenerateOrtho]);
        qgl.end_frame();

        let main = memory.contents("frame_0001.c").unwrap();
        assert!(main.contains("\tglOrthof(0x0p+0, 0x1.4p+9, 0x1.ep+8, 0x0p+0, 0x0p+0, 0x1p+0);\n"));
        assert!(main.contains(
            "\tfloat Matrix_1[16] = {\n\
             \t\t0x1p+0, 0x0p+0, 0x0p+0, 0x0p+0,\n\
             \t\t0x0p+0, 0x1p+0, 0x0p+0, 0x0p+0,\n\
             \t\t0x0p+0, 0x0p+0, 0x1p+0, 0x0p+0,\n\
             \t\t0x0p+0, 0x0p+0, 0x0p+0, 0x1p+0,\n\
             \t};\n\
             \tglLoadMatrixf(Matrix_1);\n"
        ));
        assert!(!main.contains("Matrix_2"));
    }

    #[test]
    fn test_unsupported_input() {
        let (_memory, mut qgl) = recording();
        let indices: [u32; 3] = [0, 1, 2];

        unsafe { qgl.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_INT, indices.as_ptr() as *const GLvoid) };
        qgl.active_texture(gl::TEXTURE2);
        qgl.vertex_pointer(2, gl::SHORT, 0, indices.as_ptr() as *const GLvoid);

        assert_eq!(
            qgl.take_diagnostics(),
            vec![
                Diagnostic::UnsupportedIndexType { type_: gl::UNSIGNED_INT },
                Diagnostic::UnitOutOfRange { function: "glActiveTexture", unit: gl::TEXTURE2 },
                Diagnostic::UnsupportedArrayType { kind: ArrayKind::Vertex, type_: gl::SHORT },
            ]
        );

        // All three still went to the driver.
        let calls = qgl.backend_mut().take_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], DriverCall::active_texture { texture: gl::TEXTURE2 });
        assert_eq!(qgl.state().active_unit, 0);
    }

    #[test]
    fn test_pass_through() {
        let mut qgl = Qgl::new(Trace::new(Null::new().with_extensions("GL_OES_draw_texture")));
        let arrays = Arrays::new(2);
        let indices: [u16; 3] = [0, 1, 1];

        set_up_single_texture(&mut qgl, &arrays, 1);
        unsafe { qgl.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid) };
        qgl.end_frame();

        assert!(qgl.recorder().is_none());
        assert!(qgl.query_extension("GL_OES_draw_texture"));
        let calls = qgl.backend_mut().take_calls();
        assert_eq!(calls.len(), 11);
        assert_eq!(calls[10], DriverCall::swap_buffers);
    }

    /// Upload textures 3 and 4, then sample them on units 0 and 1.
    fn set_up_dual_texture<B: Backend>(qgl: &mut Qgl<B>, arrays: &Arrays) {
        upload(qgl, 3);
        upload(qgl, 4);
        qgl.bind_texture(gl::TEXTURE_2D, 5);

        set_up_single_texture(qgl, arrays, 3);
        qgl.active_texture(gl::TEXTURE1);
        qgl.enable(gl::TEXTURE_2D);
        qgl.bind_texture(gl::TEXTURE_2D, 4);
        qgl.client_active_texture(gl::TEXTURE1);
        qgl.enable_client_state(consts::TEXTURE_COORD_ARRAY);
        qgl.tex_coord_pointer(2, gl::FLOAT, 0, arrays.coords.as_ptr() as *const GLvoid);
    }

    /// Make at least one of every call that has a limare equivalent, and a
    /// dual-texture draw.
    fn record_everything<B: Backend>(qgl: &mut Qgl<B>, arrays: &Arrays, indices: &[u16]) {
        let mut identity = [0.0; 16];
        for i in 0..4 {
            identity[i * 5] = 1.0;
        }

        qgl.draw_buffer(gl::BACK);
        qgl.enable(gl::BLEND);
        qgl.blend_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
        qgl.depth_func(gl::LEQUAL);
        qgl.depth_mask(true);
        qgl.depth_range_f(0.0, 1.0);
        qgl.clear_depth_f(1.0);
        qgl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        qgl.viewport(0, 0, 640, 480);
        qgl.scissor(0, 0, 640, 480);
        qgl.cull_face(gl::BACK);
        qgl.color_mask(true, true, true, false);
        qgl.polygon_offset(-1.0, -2.0);
        qgl.alpha_func(gl::GREATER, 0.5);
        qgl.alpha_func_x(gl::GREATER, 0x8000);
        qgl.disable(gl::BLEND);
        qgl.matrix_mode(consts::PROJECTION);
        qgl.load_identity();
        qgl.ortho_f(0.0, 640.0, 480.0, 0.0, 0.0, 1.0);
        qgl.matrix_mode(consts::MODELVIEW);
        qgl.load_matrix_f(&identity);
        qgl.tex_env_f(consts::TEXTURE_ENV, consts::TEXTURE_ENV_MODE, consts::MODULATE as GLfloat);
        qgl.clip_plane_f(consts::CLIP_PLANE0, &[0.0, 1.0, 0.0, -4.0]);

        set_up_dual_texture(qgl, arrays);
        unsafe {
            qgl.draw_elements(gl::TRIANGLES, indices.len() as GLsizei, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid)
        };
        qgl.delete_textures(&[3, 4]);
        qgl.end_frame();
    }

    /// The names of the limare functions `text` calls.
    fn limare_calls(text: &str) -> BTreeSet<String> {
        text.lines()
            .filter_map(|line| {
                let start = line.find("limare_")?;
                let end = start + line[start..].find('(')?;
                Some(line[start..end].to_string())
            })
            .collect()
    }

    #[test]
    fn test_dual_texture_draw() {
        let (memory, mut qgl) = recording();
        let arrays = Arrays::new(4);
        let indices: [u16; 6] = [0, 2, 1, 2, 3, 1];

        set_up_dual_texture(&mut qgl, &arrays);
        unsafe { qgl.draw_elements(gl::TRIANGLES, 6, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid) };
        assert_eq!(qgl.take_diagnostics(), vec![]);
        assert!(qgl.state().units[1].coords.is_none());
        qgl.end_frame();

        let main = memory.contents("frame_0001.c").unwrap();
        assert!(main.contains(
            "\tprogram_switch(PROGRAM_DUAL_TEXTURE);\n\
             \tdraw_dual_texture(&Draw_0, &Texture_0, &Texture_1);\n"
        ));

        let draws = memory.contents("frame_0001_draws.c").unwrap();
        assert!(draws.contains("static const float TextureCoordinates_0_0[4][2] = {\n"));
        assert!(draws.contains("static const float TextureCoordinates_0_1[4][2] = {\n"));
        assert!(draws.contains("\t.coords = { TextureCoordinates_0_0[0], TextureCoordinates_0_1[0] },\n"));
        assert!(draws.contains("\t.coord_sizes = { 2, 2 },\n"));

        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert!(limare.contains("\tlimare_program_current(state, program_dual_texture);\n"));
        assert!(limare.contains(
            "\tlimare_attribute_pointer(state, \"aTexCoord1\", LIMARE_ATTRIB_FLOAT, 2, 0, 4, \
             (void *) Draw_0.coords[1]);\n"
        ));
        assert!(limare.contains("\tlimare_texture_attach(state, \"uTexture0\", Texture_0.handle);\n"));
        assert!(limare.contains("\tlimare_texture_attach(state, \"uTexture1\", Texture_1.handle);\n"));
    }

    #[test]
    fn test_limare_calls_declared() {
        let (memory, mut qgl) = recording();
        let arrays = Arrays::new(4);
        record_everything(&mut qgl, &arrays, &[0, 2, 1, 2, 3, 1]);

        let limare = memory.contents("frame_0001_limare.c").unwrap();
        let header = memory.contents(REPLAY_HEADER).unwrap();
        let calls = limare_calls(&limare);
        assert!(calls.len() >= 20, "{:?}", calls);
        for name in &calls {
            assert!(
                header.contains(&format!("int {}(struct limare_state *state", name)),
                "{} is not declared",
                name
            );
        }
        assert!(header.contains("\tLIMARE_ATTRIB_FLOAT = "));
        assert!(header.contains("\tLIMARE_ATTRIB_U8N = "));
        assert!(header.contains("#define LIMA_TEXEL_FORMAT_RGBA_8888 "));
    }

    fn syntax_check(dir: &Path, file: &Path) -> io::Result<bool> {
        let cc = std::env::var("CC").unwrap_or_else(|_| "cc".to_string());
        let status = Command::new(cc)
            .args(&["-std=c99", "-fsyntax-only", "-Werror=implicit-function-declaration", "-I"])
            .arg(dir)
            .arg(file)
            .status()?;
        Ok(status.success())
    }

    #[test]
    fn test_frame_sources_compile() {
        let dir = std::env::temp_dir().join(format!("glimp-replay-cc-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        // Only meaningful with a C compiler and the GLES 1 headers around.
        let check = dir.join("gles_check.c");
        fs::write(&check, "#include <GLES/gl.h>\n").unwrap();
        let usable = syntax_check(&dir, &check).unwrap_or(false);
        fs::remove_file(&check).unwrap();
        if !usable {
            eprintln!("no C compiler with GLES headers, not checking generated sources");
            fs::remove_dir_all(&dir).unwrap();
            return;
        }

        let config = RecordConfig { directory: dir.clone(), ..RecordConfig::default() };
        let files = Files::create(&dir).unwrap();
        let mut qgl = Qgl::recording(Null::new(), Box::new(files), config).unwrap();
        let arrays = Arrays::new(4);
        record_everything(&mut qgl, &arrays, &[0, 2, 1, 2, 3, 1]);
        drop(qgl);

        let mut checked = 0;
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().map_or(false, |ext| ext == "c") {
                assert!(syntax_check(&dir, &path).unwrap(), "{} doesn't compile", path.display());
                checked += 1;
            }
        }
        assert_eq!(checked, 4);
        fs::remove_dir_all(&dir).unwrap();
    }
}
