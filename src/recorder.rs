//! Writing frames of recorded calls as C source.
//!
//! Each frame of the game becomes a set of source files that, compiled
//! together with a small replay harness, reissue the frame's draws without
//! the game:
//!
//! - `frame_NNNN.c` holds the function `frame_NNNN`, which makes the frame's
//!   GL calls in order.
//!
//! - `frame_NNNN.h` declares the frame's draw descriptors.
//!
//! - `frame_NNNN_draws.c` holds each draw's vertex and index arrays, and the
//!   `struct draw` descriptor pointing at them.
//!
//! - `frame_NNNN_textures.c` and `frame_NNNN_textures.h` hold and declare
//!   every texture whose upload finished during the frame.
//!
//! - `frame_NNNN_limare.c` holds `frame_NNNN_limare`, the same frame
//!   expressed as limare driver calls. This one can be turned off.
//!
//! A frame's files only refer to each other, with one exception: a texture
//! uploaded in an earlier frame can still be drawn with. So every texture is
//! also declared in `textures.h`, which grows over the whole run. The
//! structure types and harness entry points are declared once, in
//! `replay.h`.

use gleam::gl::{GLenum, GLuint};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crate::config::RecordConfig;
use crate::consts;
use crate::diag::Error;
use crate::draw::Program;
use crate::dump;
use crate::files::Storage;
use crate::symbol;
use crate::texture::{TextureRecord, TEXTURE_LEVEL_COUNT};
use crate::write_image;

/// The name of the header declaring the types and functions the replay
/// harness provides.
pub const REPLAY_HEADER: &str = "replay.h";

/// The name of the header declaring every texture recorded so far.
pub const TEXTURE_INDEX: &str = "textures.h";

/// The streams making up one frame's file set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stream {
    Main,
    Header,
    Draws,
    Textures,
    TextureHeader,
    Limare,
}

impl Stream {
    pub const ALL: [Stream; 6] = [
        Stream::Main,
        Stream::Header,
        Stream::Draws,
        Stream::Textures,
        Stream::TextureHeader,
        Stream::Limare,
    ];

    pub fn file_name(self, frame: u32) -> String {
        let suffix = match self {
            Stream::Main => ".c",
            Stream::Header => ".h",
            Stream::Draws => "_draws.c",
            Stream::Textures => "_textures.c",
            Stream::TextureHeader => "_textures.h",
            Stream::Limare => "_limare.c",
        };
        format!("frame_{:04}{}", frame, suffix)
    }

    /// The text each stream starts with.
    pub fn preamble(self, frame: u32) -> String {
        match self {
            Stream::Main => format!(
                "#include \"{}\"\n#include \"{}\"\n#include \"frame_{:04}.h\"\n\n\
                 void\nframe_{:04}(void)\n{{\n",
                REPLAY_HEADER, TEXTURE_INDEX, frame, frame
            ),
            Stream::Header => format!(
                "#ifndef FRAME_{:04}_H\n#define FRAME_{:04}_H 1\n\n#include \"{}\"\n\n\
                 void frame_{:04}(void);\n\
                 void frame_{:04}_limare(struct limare_state *state);\n\n",
                frame, frame, REPLAY_HEADER, frame, frame
            ),
            Stream::Draws => format!("#include \"frame_{:04}.h\"\n\n", frame),
            Stream::Textures => format!(
                "#include \"{}\"\n#include \"frame_{:04}_textures.h\"\n\n",
                REPLAY_HEADER, frame
            ),
            Stream::TextureHeader => format!(
                "#ifndef FRAME_{:04}_TEXTURES_H\n#define FRAME_{:04}_TEXTURES_H 1\n\n\
                 #include \"{}\"\n\n",
                frame, frame, REPLAY_HEADER
            ),
            Stream::Limare => format!(
                "#include \"{}\"\n#include \"{}\"\n#include \"frame_{:04}.h\"\n\n\
                 void\nframe_{:04}_limare(struct limare_state *state)\n{{\n",
                REPLAY_HEADER, TEXTURE_INDEX, frame, frame
            ),
        }
    }

    /// The text that closes each stream. Every complete stream ends with
    /// exactly this.
    pub fn trailer(self, frame: u32) -> String {
        match self {
            Stream::Main | Stream::Limare => "}\n".to_string(),
            Stream::Header => format!("\n#endif /* FRAME_{:04}_H */\n", frame),
            Stream::Draws => format!("/* end of frame_{:04}_draws.c */\n", frame),
            Stream::Textures => format!("/* end of frame_{:04}_textures.c */\n", frame),
            Stream::TextureHeader => format!("\n#endif /* FRAME_{:04}_TEXTURES_H */\n", frame),
        }
    }
}

/// The open file set of the frame being recorded, and its counters.
pub struct Frame {
    pub number: u32,
    outs: [Option<Box<dyn Write>>; 6],

    /// Draws recorded so far this frame. Names `Draw_K` and its arrays.
    pub draw_count: usize,

    /// `glLoadMatrixf` calls recorded so far this frame. Names `Matrix_K`.
    pub matrix_count: usize,

    /// The program the replay has selected, if any yet this frame.
    pub program: Option<Program>,
}

impl Frame {
    /// Write to `stream`. Writing to the limare stream when it's turned off
    /// does nothing.
    pub fn write(&mut self, stream: Stream, args: fmt::Arguments) -> io::Result<()> {
        match self.outs[stream as usize].as_mut() {
            Some(out) => out.write_fmt(args),
            None => Ok(()),
        }
    }

    /// Direct access to `stream`, if it is open.
    pub fn out(&mut self, stream: Stream) -> Option<&mut (dyn Write + 'static)> {
        self.outs[stream as usize].as_mut().map(|out| &mut **out)
    }

    pub fn main(&mut self, args: fmt::Arguments) -> io::Result<()> {
        self.write(Stream::Main, args)
    }

    pub fn limare(&mut self, args: fmt::Arguments) -> io::Result<()> {
        self.write(Stream::Limare, args)
    }

    /// Write the same statement to both the main and limare streams.
    pub fn both(&mut self, args: fmt::Arguments) -> io::Result<()> {
        self.main(args)?;
        self.limare(args)
    }
}

/// Writes recorded calls into frame file sets.
pub struct Recorder {
    storage: Box<dyn Storage>,
    config: RecordConfig,

    /// The number the next frame opened will get.
    next_frame: u32,

    pub(crate) frame: Option<Frame>,

    /// Set when a write fails. Nothing more is written until the next frame
    /// starts.
    suspended: bool,

    /// Serial numbers of the textures recorded so far, by GL name. Names
    /// `Texture_S`.
    pub(crate) textures: HashMap<GLuint, usize>,
    texture_serial: usize,

    /// Textures finished while nothing could be written. They go into the
    /// next frame that opens.
    deferred: Vec<TextureRecord>,
}

impl Recorder {
    /// Start a recording in `storage`, writing the run-wide headers. No
    /// frame is open until `begin_frame` is called.
    pub fn new(mut storage: Box<dyn Storage>, config: RecordConfig) -> Result<Recorder, Error> {
        storage.create(REPLAY_HEADER)?.write_all(replay_header().as_bytes())?;
        write!(
            storage.create(TEXTURE_INDEX)?,
            "/* Every texture recorded so far. */\n#include \"{}\"\n\n",
            REPLAY_HEADER
        )?;

        Ok(Recorder {
            storage,
            next_frame: config.first_frame,
            config,
            frame: None,
            suspended: false,
            textures: HashMap::new(),
            texture_serial: 0,
            deferred: vec![],
        })
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    /// The number of the open frame, if any.
    pub fn frame_number(&self) -> Option<u32> {
        self.frame.as_ref().map(|frame| frame.number)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Close the open frame, if any, and open the next one.
    ///
    /// If any of the new frame's files can't be created, no frame is left
    /// open.
    pub fn begin_frame(&mut self) -> Result<(), Error> {
        self.end_frame()?;

        let number = self.next_frame;
        let mut outs: [Option<Box<dyn Write>>; 6] = Default::default();
        for &stream in Stream::ALL.iter() {
            if stream == Stream::Limare && !self.config.alternate {
                continue;
            }
            let mut out = self.storage.create(&stream.file_name(number))?;
            out.write_all(stream.preamble(number).as_bytes())?;
            outs[stream as usize] = Some(out);
        }

        log::debug!("recording replay frame {}", number);
        self.next_frame = number + 1;
        self.suspended = false;
        self.frame = Some(Frame {
            number,
            outs,
            draw_count: 0,
            matrix_count: 0,
            program: None,
        });

        let deferred = std::mem::take(&mut self.deferred);
        if !deferred.is_empty() {
            log::debug!("writing {} deferred textures into frame {}", deferred.len(), number);
        }
        for record in &deferred {
            self.finish_texture(record);
        }
        Ok(())
    }

    /// Close the open frame, if any, terminating each of its streams.
    pub fn end_frame(&mut self) -> Result<(), Error> {
        let mut frame = match self.frame.take() {
            Some(frame) => frame,
            None => return Ok(()),
        };

        let number = frame.number;
        for &stream in Stream::ALL.iter() {
            if let Some(out) = frame.out(stream) {
                out.write_all(stream.trailer(number).as_bytes())?;
                out.flush()?;
            }
        }

        log::info!("finished dumping replay frame {}", number);
        Ok(())
    }

    /// Run `f` on the open frame.
    ///
    /// If there's no open frame, or recording has been suspended, do
    /// nothing. If `f` fails, log the error and suspend recording until the
    /// next frame.
    pub fn record<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Frame) -> io::Result<()>,
    {
        if self.suspended {
            return;
        }
        let result = match self.frame.as_mut() {
            Some(frame) => f(frame),
            None => return,
        };
        if let Err(err) = result {
            self.suspend(err);
        }
    }

    pub(crate) fn suspend(&mut self, err: io::Error) {
        log::error!(
            "glimp-replay: error writing frame {}: {}; recording suspended until the next frame",
            self.frame_number().unwrap_or(0),
            err
        );
        self.suspended = true;
    }

    /// True if writes would currently go anywhere.
    pub fn is_recording(&self) -> bool {
        self.frame.is_some() && !self.suspended
    }

    /// The serial number of the recorded texture named `id`.
    pub fn texture_serial(&self, id: GLuint) -> Option<usize> {
        self.textures.get(&id).copied()
    }

    /// Forget the recorded textures named in `ids`, which the renderer has
    /// deleted. Their names may be reused.
    pub fn forget_textures(&mut self, ids: &[GLuint]) {
        for id in ids {
            self.textures.remove(id);
        }
        self.deferred.retain(|record| !ids.contains(&record.id));
    }

    /// Write out a finished texture record.
    ///
    /// The texture gets the next serial number, and draws using its GL name
    /// will refer to it by that serial from now on. If no frame is open, or
    /// recording is suspended, the record waits for the next frame.
    pub fn finish_texture(&mut self, record: &TextureRecord) {
        if !self.is_recording() {
            log::debug!("texture {} deferred to the next frame", record.id);
            self.deferred.retain(|pending| pending.id != record.id);
            self.deferred.push(record.clone());
            return;
        }

        let serial = self.texture_serial;
        let result = match self.frame.as_mut() {
            Some(frame) => write_texture(frame, serial, record),
            None => return,
        };
        if let Err(err) = result {
            self.suspend(err);
            self.deferred.push(record.clone());
            return;
        }

        let index = self
            .storage
            .append(TEXTURE_INDEX)
            .and_then(|mut out| Ok(write!(out, "extern struct texture Texture_{};\n", serial)?));
        if let Err(err) = index {
            log::error!("{}", err);
            self.suspended = true;
            return;
        }

        self.texture_serial += 1;
        self.textures.insert(record.id, serial);
        log::debug!("recorded texture {} as Texture_{}", record.id, serial);

        if self.config.texture_images {
            self.write_texture_image(serial, record);
        }
    }

    fn write_texture_image(&mut self, serial: usize, record: &TextureRecord) {
        let base = record.base();
        let texels = match &base.texels {
            Some(texels) => texels,
            None => return,
        };
        let name = format!("texture_{:04}.png", serial);
        let result = self.storage.create(&name).and_then(|out| {
            write_image::write_image(out, texels, base.width as u32, base.height as u32)
        });
        if let Err(err) = result {
            // The frame files are still intact, so keep recording.
            log::error!("{}", err);
        }
    }
}

fn param_name(param: i32) -> std::borrow::Cow<'static, str> {
    symbol::enum_name(param as GLenum)
}

fn write_texture(frame: &mut Frame, serial: usize, record: &TextureRecord) -> io::Result<()> {
    let mut levels: Vec<_> = record.levels.iter().collect();
    levels.sort_by_key(|level| level.level);

    if let Some(out) = frame.out(Stream::Textures) {
        for level in &levels {
            match &level.texels {
                Some(texels) if !texels.is_empty() => {
                    writeln!(
                        out,
                        "static const unsigned int Texture_{}_{}[{} * {}] = {{",
                        serial, level.level, level.width, level.height
                    )?;
                    dump::write_words(out, texels)?;
                    writeln!(out, "}};\n")?;
                }
                _ => (),
            }
        }

        let params = &record.parameters;
        writeln!(out, "struct texture Texture_{} = {{", serial)?;
        writeln!(out, "\t.id = {},", record.id)?;
        writeln!(out, "\t.format = {},", symbol::enum_name(record.format))?;
        writeln!(out, "\t.min_filter = {},", param_name(params.min_filter))?;
        writeln!(out, "\t.mag_filter = {},", param_name(params.mag_filter))?;
        writeln!(out, "\t.wrap_s = {},", param_name(params.wrap_s))?;
        writeln!(out, "\t.wrap_t = {},", param_name(params.wrap_t))?;
        writeln!(out, "\t.level_count = {},", levels.len())?;
        writeln!(out, "\t.levels = {{")?;
        for level in &levels {
            let data = match &level.texels {
                Some(texels) if !texels.is_empty() => format!("Texture_{}_{}", serial, level.level),
                _ => "NULL".to_string(),
            };
            writeln!(
                out,
                "\t\t[{}] = {{ {}, {}, {} }},",
                level.level, level.width, level.height, data
            )?;
        }
        writeln!(out, "\t}},")?;
        writeln!(out, "}};\n")?;
    }

    frame.write(
        Stream::TextureHeader,
        format_args!("extern struct texture Texture_{};\n", serial),
    )?;
    frame.main(format_args!("\ttexture_upload(&Texture_{});\n", serial))?;

    for level in &levels {
        if level.level == 0 {
            frame.limare(format_args!(
                "\tTexture_{s}.handle = limare_texture_upload(state, Texture_{s}.levels[0].data, \
                 {}, {}, LIMA_TEXEL_FORMAT_RGBA_8888, 0);\n",
                level.width,
                level.height,
                s = serial
            ))?;
        } else {
            frame.limare(format_args!(
                "\tlimare_texture_mipmap_upload(state, Texture_{s}.handle, {l}, \
                 Texture_{s}.levels[{l}].data);\n",
                s = serial,
                l = level.level
            ))?;
        }
    }
    let params = &record.parameters;
    frame.limare(format_args!(
        "\tlimare_texture_parameters(state, Texture_{}.handle, {}, {}, {}, {});\n",
        serial,
        param_name(params.min_filter),
        param_name(params.mag_filter),
        param_name(params.wrap_s),
        param_name(params.wrap_t)
    ))?;
    Ok(())
}

/// The contents of `replay.h`.
fn replay_header() -> String {
    format!(
        "#ifndef REPLAY_H\n\
         #define REPLAY_H 1\n\
         \n\
         #include <GLES/gl.h>\n\
         \n\
         #define TEXTURE_LEVEL_COUNT {levels}\n\
         \n\
         struct texture_level {{\n\
         \tint width;\n\
         \tint height;\n\
         \tconst unsigned int *data;\n\
         }};\n\
         \n\
         struct texture {{\n\
         \tGLuint id;\n\
         \tGLenum format;\n\
         \tGLint min_filter;\n\
         \tGLint mag_filter;\n\
         \tGLint wrap_s;\n\
         \tGLint wrap_t;\n\
         \tint level_count;\n\
         \tstruct texture_level levels[TEXTURE_LEVEL_COUNT];\n\
         \tGLuint name;\n\
         \tint handle;\n\
         }};\n\
         \n\
         struct draw {{\n\
         \tGLenum mode;\n\
         \tint vertex_count;\n\
         \tint index_count;\n\
         \tconst unsigned short *indices;\n\
         \tconst unsigned char *colors;\n\
         \tint color_size;\n\
         \tconst float *coords[2];\n\
         \tint coord_sizes[2];\n\
         \tconst float *vertices;\n\
         \tint vertex_size;\n\
         }};\n\
         \n\
         #define {single} 1\n\
         #define {dual} 2\n\
         \n\
         void program_switch(int program);\n\
         void texture_upload(struct texture *texture);\n\
         void draw_single_texture(struct draw *draw, struct texture *texture0);\n\
         void draw_dual_texture(struct draw *draw, struct texture *texture0,\n\
         \t\t       struct texture *texture1);\n\
         \n\
         struct limare_state;\n\
         extern int {limare_single};\n\
         extern int {limare_dual};\n\
         \n\
         #ifdef REPLAY_HAVE_LIMARE_H\n\
         #include <limare.h>\n\
         #else\n\
         #define LIMA_TEXEL_FORMAT_RGBA_8888 0x{texel_format:02X}\n\
         \n\
         enum limare_attrib_type {{\n\
         \tLIMARE_ATTRIB_FLOAT = 0x000,\n\
         \tLIMARE_ATTRIB_U8N = 0x009,\n\
         }};\n\
         \n\
         int limare_enable(struct limare_state *state, int parameter);\n\
         int limare_disable(struct limare_state *state, int parameter);\n\
         int limare_alpha_func(struct limare_state *state, int func, float value);\n\
         int limare_blend_func(struct limare_state *state, int sfactor, int dfactor);\n\
         int limare_color_mask(struct limare_state *state, int red, int green,\n\
         \t\t      int blue, int alpha);\n\
         int limare_cullface(struct limare_state *state, int value);\n\
         int limare_depth(struct limare_state *state, float near, float far);\n\
         int limare_depth_buffer_clear(struct limare_state *state);\n\
         int limare_depth_clear_depth(struct limare_state *state, float depth);\n\
         int limare_depth_func(struct limare_state *state, int value);\n\
         int limare_depth_mask(struct limare_state *state, int value);\n\
         int limare_polygon_offset(struct limare_state *state, float factor, float units);\n\
         int limare_scissor(struct limare_state *state, int x, int y,\n\
         \t\t   int width, int height);\n\
         int limare_viewport(struct limare_state *state, int x, int y,\n\
         \t\t    int width, int height);\n\
         int limare_program_current(struct limare_state *state, int handle);\n\
         int limare_texture_upload(struct limare_state *state, const void *pixels,\n\
         \t\t\t  int width, int height, int format, int mipmap);\n\
         int limare_texture_mipmap_upload(struct limare_state *state, int handle,\n\
         \t\t\t\t int level, const void *pixels);\n\
         int limare_texture_parameters(struct limare_state *state, int handle,\n\
         \t\t\t      int filter_min, int filter_mag,\n\
         \t\t\t      int wrap_s, int wrap_t);\n\
         int limare_texture_attach(struct limare_state *state, const char *uniform_name,\n\
         \t\t\t  int handle);\n\
         int limare_attribute_pointer(struct limare_state *state, const char *name,\n\
         \t\t\t     enum limare_attrib_type type, int component_size,\n\
         \t\t\t     int entry_stride, int entry_count, void *data);\n\
         int limare_draw_elements(struct limare_state *state, int mode, int count,\n\
         \t\t\t void *indices, int indices_type);\n\
         #endif /* REPLAY_HAVE_LIMARE_H */\n\
         \n\
         #endif /* REPLAY_H */\n",
        levels = TEXTURE_LEVEL_COUNT,
        single = Program::SingleTexture.replay_name(),
        dual = Program::DualTexture.replay_name(),
        limare_single = Program::SingleTexture.limare_name(),
        limare_dual = Program::DualTexture.limare_name(),
        texel_format = consts::LIMA_TEXEL_FORMAT_RGBA_8888,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::Memory;
    use crate::texture::{Level, Parameters};
    use gleam::gl;

    fn recorder(memory: &Memory, config: RecordConfig) -> Recorder {
        Recorder::new(Box::new(memory.clone()), config).unwrap()
    }

    fn texture(id: GLuint) -> TextureRecord {
        TextureRecord {
            id,
            format: gl::RGBA,
            levels: vec![
                Level { level: 0, width: 2, height: 1, texels: Some(vec![0xff0000ff, 0xff00ff00]) },
                Level { level: 1, width: 1, height: 1, texels: Some(vec![0xff00ff80]) },
            ],
            parameters: Parameters::default(),
        }
    }

    #[test]
    fn test_empty_frame_is_balanced() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig::default());
        recorder.begin_frame().unwrap();
        recorder.end_frame().unwrap();

        for &stream in Stream::ALL.iter() {
            let name = stream.file_name(1);
            let text = memory.contents(&name).unwrap();
            assert!(text.starts_with(&stream.preamble(1)), "{}", name);
            assert!(text.ends_with(&stream.trailer(1)), "{}", name);
            assert_eq!(text.matches('{').count(), text.matches('}').count(), "{}", name);
        }
        assert_eq!(
            memory.contents("frame_0001.c").unwrap(),
            "#include \"replay.h\"\n#include \"textures.h\"\n#include \"frame_0001.h\"\n\n\
             void\nframe_0001(void)\n{\n}\n"
        );
        assert!(memory.contents(REPLAY_HEADER).unwrap().contains("struct draw {"));
    }

    #[test]
    fn test_frame_naming() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig { first_frame: 9, ..Default::default() });
        recorder.begin_frame().unwrap();
        assert_eq!(recorder.frame_number(), Some(9));
        recorder.begin_frame().unwrap();
        assert_eq!(recorder.frame_number(), Some(10));
        recorder.end_frame().unwrap();
        assert_eq!(recorder.frame_number(), None);

        let names = memory.names();
        for &stream in Stream::ALL.iter() {
            assert!(names.contains(&stream.file_name(9)));
            assert!(names.contains(&stream.file_name(10)));
        }
        assert!(names.contains(&"frame_0010_textures.h".to_string()));

        // Frame 9 was closed when frame 10 began.
        let text = memory.contents("frame_0009.h").unwrap();
        assert!(text.ends_with("#endif /* FRAME_0009_H */\n"));
    }

    #[test]
    fn test_no_alternate_stream() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig { alternate: false, ..Default::default() });
        recorder.begin_frame().unwrap();
        recorder.record(|frame| frame.limare(format_args!("\tlimare_frame_flush(state);\n")));
        recorder.end_frame().unwrap();
        assert!(!memory.names().contains(&"frame_0001_limare.c".to_string()));
        assert_eq!(memory.names().len(), 7);
    }

    #[test]
    fn test_finish_texture() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig::default());

        // Outside a frame, the texture waits for one to open.
        recorder.finish_texture(&texture(3));
        assert_eq!(recorder.texture_serial(3), None);

        recorder.begin_frame().unwrap();
        assert_eq!(recorder.texture_serial(3), Some(0));
        recorder.finish_texture(&texture(4));
        recorder.end_frame().unwrap();

        assert_eq!(recorder.texture_serial(3), Some(0));
        assert_eq!(recorder.texture_serial(4), Some(1));

        let textures = memory.contents("frame_0001_textures.c").unwrap();
        assert!(textures.contains(
            "static const unsigned int Texture_0_0[2 * 1] = {\n\
             \t\t0xFF0000FF, 0xFF00FF00,\n};\n"
        ));
        assert!(textures.contains("\t.min_filter = GL_NEAREST_MIPMAP_LINEAR,\n"));
        assert!(textures.contains("\t.level_count = 2,\n"));
        assert!(textures.contains("\t\t[1] = { 1, 1, Texture_1_1 },\n"));

        let header = memory.contents("frame_0001_textures.h").unwrap();
        assert!(header.contains("extern struct texture Texture_1;\n"));

        let index = memory.contents(TEXTURE_INDEX).unwrap();
        assert!(index.ends_with(
            "extern struct texture Texture_0;\nextern struct texture Texture_1;\n"
        ));

        let main = memory.contents("frame_0001.c").unwrap();
        assert!(main.contains("\ttexture_upload(&Texture_0);\n"));
        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert!(limare.contains("limare_texture_mipmap_upload(state, Texture_1.handle, 1, "));

        recorder.forget_textures(&[3]);
        assert_eq!(recorder.texture_serial(3), None);
    }

    struct Unwritable;

    impl Storage for Unwritable {
        fn create(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
            if name.starts_with("frame_") {
                return Err(Error::Open {
                    path: name.into(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            Ok(Box::new(io::sink()))
        }

        fn append(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
            self.create(name)
        }
    }

    #[test]
    fn test_open_failure() {
        let mut recorder = Recorder::new(Box::new(Unwritable), RecordConfig::default()).unwrap();
        match recorder.begin_frame() {
            Err(Error::Open { path, .. }) => assert_eq!(path, std::path::PathBuf::from("frame_0001.c")),
            other => panic!("expected an open error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(recorder.frame_number(), None);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_write_failure_suspends() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig::default());
        recorder.begin_frame().unwrap();

        recorder.record(|_| Err(io::Error::new(io::ErrorKind::Other, "disk full")));
        assert!(recorder.is_suspended());

        let mut called = false;
        recorder.record(|_| {
            called = true;
            Ok(())
        });
        assert!(!called);

        // The next frame picks up again.
        recorder.begin_frame().unwrap();
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_texture_finished_while_suspended() {
        let memory = Memory::new();
        let mut recorder = recorder(&memory, RecordConfig::default());
        recorder.begin_frame().unwrap();
        recorder.record(|_| Err(io::Error::new(io::ErrorKind::Other, "disk full")));

        recorder.finish_texture(&texture(5));
        recorder.finish_texture(&texture(6));
        assert_eq!(recorder.texture_serial(5), None);

        // Deleted before it could be written, so it never will be.
        recorder.forget_textures(&[6]);

        recorder.begin_frame().unwrap();
        assert_eq!(recorder.texture_serial(5), Some(0));
        assert_eq!(recorder.texture_serial(6), None);
        recorder.end_frame().unwrap();

        assert!(!memory.contents("frame_0001_textures.c").unwrap().contains("Texture_0"));
        let textures = memory.contents("frame_0002_textures.c").unwrap();
        assert!(textures.contains("struct texture Texture_0 = {\n\t.id = 5,\n"));
        assert!(!textures.contains("Texture_1"));
        assert!(memory.contents("frame_0002.c").unwrap().contains("\ttexture_upload(&Texture_0);\n"));
    }
}
