//! Recording `glDrawElements` calls.
//!
//! A draw call names only its primitive type and its indices; the vertex
//! data comes from whatever client arrays are enabled and pointed at the
//! time. To make a draw replayable on its own, we copy out everything it
//! reads:
//!
//! - Only vertices the indices mention are copied. We take the count to be
//!   one more than the largest index, since the renderer always uses dense
//!   index ranges starting at zero. Indices with gaps just produce a larger
//!   dump than necessary.
//!
//! - Colors and unit 0's texture coordinates are required. The replay
//!   harness only has single- and dual-texture programs, so a draw missing
//!   either can't be replayed, and we leave it out.
//!
//! - Vertices are copied four floats wide if the renderer gave a stride,
//!   since its strided vertex arrays are padded to four, and two wide
//!   otherwise.
//!
//! Each recorded draw becomes a block of arrays and a `struct draw` in the
//! frame's draws file, and a call to one of the harness's draw functions in
//! the main stream, preceded by a program switch if the draw needs a
//! different program than the last one did.

use gleam::gl::{self, GLenum, GLuint};
use std::io::{self, Write};
use std::slice;

use crate::diag::{ArrayKind, Diagnostic, Diagnostics};
use crate::dump;
use crate::recorder::{Frame, Recorder, Stream};
use crate::state::{ArrayPointer, StateTracker, TEXTURE_UNIT_COUNT};
use crate::symbol;

/// The replay harness's shader programs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Program {
    SingleTexture,
    DualTexture,
}

impl Program {
    /// The harness's constant for this program.
    pub fn replay_name(self) -> &'static str {
        match self {
            Program::SingleTexture => "PROGRAM_SINGLE_TEXTURE",
            Program::DualTexture => "PROGRAM_DUAL_TEXTURE",
        }
    }

    /// The limare harness's variable holding this program.
    pub fn limare_name(self) -> &'static str {
        match self {
            Program::SingleTexture => "program_single_texture",
            Program::DualTexture => "program_dual_texture",
        }
    }

    fn draw_function(self) -> &'static str {
        match self {
            Program::SingleTexture => "draw_single_texture",
            Program::DualTexture => "draw_dual_texture",
        }
    }

    pub fn units(self) -> usize {
        match self {
            Program::SingleTexture => 1,
            Program::DualTexture => 2,
        }
    }
}

/// The number of vertices `indices` refers to.
pub fn vertex_count(indices: &[u16]) -> usize {
    indices.iter().max().map_or(0, |&max| max as usize + 1)
}

/// Decide whether a draw can be recorded, and with which program.
pub fn select_program(state: &StateTracker, draw: usize) -> Result<Program, Diagnostic> {
    if !state.color_enabled {
        return Err(Diagnostic::MissingColors { draw });
    }
    if !state.units[0].is_live() {
        return Err(Diagnostic::MissingTexture { draw });
    }
    Ok(if state.units[1].is_live() {
        Program::DualTexture
    } else {
        Program::SingleTexture
    })
}

/// One client array's contents, copied out for a single draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute<T> {
    pub width: usize,
    pub rows: Vec<Vec<T>>,
}

/// Everything needed to write out one draw.
#[derive(Clone, Debug)]
pub struct DrawRecord<'a> {
    pub id: usize,
    pub mode: GLenum,
    pub program: Program,
    pub vertex_count: usize,
    pub indices: &'a [u16],
    pub colors: Attribute<u8>,

    /// Texture coordinates for each unit the program uses.
    pub coords: Vec<Attribute<f32>>,
    pub vertices: Attribute<f32>,

    /// The texture bound to each unit the program uses.
    pub textures: Vec<GLuint>,
}

fn require(pointer: Option<ArrayPointer>, draw: usize, kind: ArrayKind) -> Result<ArrayPointer, Diagnostic> {
    match pointer {
        Some(pointer) if !pointer.ptr.is_null() => Ok(pointer),
        _ => Err(Diagnostic::MissingPointer { draw, kind }),
    }
}

/// Borrow the bytes of `count` rows of `width` elements of `size` bytes
/// from `pointer`.
///
/// Safety: `pointer` must point to at least that much readable memory.
unsafe fn array_bytes<'a>(pointer: &ArrayPointer, count: usize, width: usize, size: usize) -> &'a [u8] {
    let len = dump::span(count, pointer.stride.max(0) as usize, width, size);
    slice::from_raw_parts(pointer.ptr as *const u8, len)
}

unsafe fn gather_floats(pointer: &ArrayPointer, count: usize, width: usize) -> Attribute<f32> {
    let bytes = array_bytes(pointer, count, width, 4);
    Attribute {
        width,
        rows: dump::gather_floats(bytes, count, pointer.stride.max(0) as usize, width),
    }
}

/// Assemble the record for draw number `id`, copying out the client arrays
/// it uses.
///
/// Safety: every array pointer the draw uses must be valid for the vertices
/// `indices` refers to.
pub unsafe fn capture<'a>(
    state: &StateTracker,
    id: usize,
    mode: GLenum,
    indices: &'a [u16],
) -> Result<DrawRecord<'a>, Diagnostic> {
    let program = select_program(state, id)?;
    let vertex_count = vertex_count(indices);

    let color_pointer = require(state.colors, id, ArrayKind::Color)?;
    let vertex_pointer = require(state.vertices, id, ArrayKind::Vertex)?;
    let units = &state.units[..program.units()];
    let coord_pointers = units
        .iter()
        .map(|unit| require(unit.coords, id, ArrayKind::TexCoord))
        .collect::<Result<Vec<_>, _>>()?;

    let color_width = color_pointer.size.max(1) as usize;
    let colors = Attribute {
        width: color_width,
        rows: dump::gather_bytes(
            array_bytes(&color_pointer, vertex_count, color_width, 1),
            vertex_count,
            color_pointer.stride.max(0) as usize,
            color_width,
        ),
    };

    let coords = coord_pointers
        .iter()
        .map(|pointer| gather_floats(pointer, vertex_count, pointer.size.max(1) as usize))
        .collect();

    let vertex_width = if vertex_pointer.stride != 0 { 4 } else { 2 };
    let vertices = gather_floats(&vertex_pointer, vertex_count, vertex_width);

    Ok(DrawRecord {
        id,
        mode,
        program,
        vertex_count,
        indices,
        colors,
        coords,
        vertices,
        textures: units.iter().map(|unit| unit.bound).collect(),
    })
}

impl Recorder {
    /// Record a `glDrawElements` of `indices` using the arrays `state`
    /// describes.
    ///
    /// Draws that can't be recorded are reported to `diags` and skipped,
    /// leaving no trace in the frame.
    ///
    /// Safety: every array pointer in `state` that the draw uses must be
    /// valid for the vertices `indices` refers to.
    pub unsafe fn draw_elements(
        &mut self,
        state: &StateTracker,
        mode: GLenum,
        indices: &[u16],
        diags: &mut Diagnostics,
    ) {
        if !self.is_recording() {
            return;
        }
        let id = match self.frame.as_ref() {
            Some(frame) => frame.draw_count,
            None => return,
        };
        if indices.is_empty() {
            log::debug!("draw {} has no indices, not recorded", id);
            return;
        }

        let record = match capture(state, id, mode, indices) {
            Ok(record) => record,
            Err(diagnostic) => {
                diags.report(diagnostic);
                return;
            }
        };

        let textures: Vec<Option<usize>> = record
            .textures
            .iter()
            .map(|&texture| {
                let serial = self.texture_serial(texture);
                if serial.is_none() {
                    diags.report(Diagnostic::UnrecordedTexture { draw: id, texture });
                }
                serial
            })
            .collect();

        let result = match self.frame.as_mut() {
            Some(frame) => write_draw(frame, &record, &textures),
            None => return,
        };
        if let Err(err) = result {
            self.suspend(err);
        }
    }
}

fn write_draw(frame: &mut Frame, record: &DrawRecord, textures: &[Option<usize>]) -> io::Result<()> {
    let id = record.id;
    let count = record.vertex_count;

    if let Some(out) = frame.out(Stream::Draws) {
        writeln!(
            out,
            "static const unsigned char Colors_{}[{}][{}] = {{",
            id, count, record.colors.width
        )?;
        dump::write_byte_rows(out, &record.colors.rows)?;
        writeln!(out, "}};\n")?;

        for (unit, coords) in record.coords.iter().enumerate() {
            writeln!(
                out,
                "static const float TextureCoordinates_{}_{}[{}][{}] = {{",
                id, unit, count, coords.width
            )?;
            dump::write_float_rows(out, &coords.rows)?;
            writeln!(out, "}};\n")?;
        }

        writeln!(
            out,
            "static const float Vertices_{}[{}][{}] = {{",
            id, count, record.vertices.width
        )?;
        dump::write_float_rows(out, &record.vertices.rows)?;
        writeln!(out, "}};\n")?;

        writeln!(
            out,
            "static const unsigned short Indices_{}[{}] = {{",
            id,
            record.indices.len()
        )?;
        dump::write_indices(out, record.indices)?;
        writeln!(out, "}};\n")?;

        let mut coords = vec!["NULL".to_string(); TEXTURE_UNIT_COUNT];
        let mut coord_sizes = vec![0; TEXTURE_UNIT_COUNT];
        for (unit, attribute) in record.coords.iter().enumerate() {
            coords[unit] = format!("TextureCoordinates_{}_{}[0]", id, unit);
            coord_sizes[unit] = attribute.width;
        }

        writeln!(out, "struct draw Draw_{} = {{", id)?;
        writeln!(out, "\t.mode = {},", symbol::enum_name(record.mode))?;
        writeln!(out, "\t.vertex_count = {},", count)?;
        writeln!(out, "\t.index_count = {},", record.indices.len())?;
        writeln!(out, "\t.indices = Indices_{},", id)?;
        writeln!(out, "\t.colors = Colors_{}[0],", id)?;
        writeln!(out, "\t.color_size = {},", record.colors.width)?;
        writeln!(out, "\t.coords = {{ {}, {} }},", coords[0], coords[1])?;
        writeln!(out, "\t.coord_sizes = {{ {}, {} }},", coord_sizes[0], coord_sizes[1])?;
        writeln!(out, "\t.vertices = Vertices_{}[0],", id)?;
        writeln!(out, "\t.vertex_size = {},", record.vertices.width)?;
        writeln!(out, "}};\n")?;
    }

    frame.write(Stream::Header, format_args!("extern struct draw Draw_{};\n", id))?;

    if frame.program != Some(record.program) {
        frame.main(format_args!("\tprogram_switch({});\n", record.program.replay_name()))?;
        frame.limare(format_args!(
            "\tlimare_program_current(state, {});\n",
            record.program.limare_name()
        ))?;
        frame.program = Some(record.program);
    }

    let texture_args: Vec<String> = textures
        .iter()
        .map(|serial| match serial {
            Some(serial) => format!("&Texture_{}", serial),
            None => "NULL".to_string(),
        })
        .collect();
    frame.main(format_args!(
        "\t{}(&Draw_{}, {});\n",
        record.program.draw_function(),
        id,
        texture_args.join(", ")
    ))?;

    write_limare_draw(frame, record, textures)?;

    frame.draw_count += 1;
    Ok(())
}

fn write_limare_draw(frame: &mut Frame, record: &DrawRecord, textures: &[Option<usize>]) -> io::Result<()> {
    let id = record.id;
    let count = record.vertex_count;

    frame.limare(format_args!(
        "\tlimare_attribute_pointer(state, \"aPosition\", LIMARE_ATTRIB_FLOAT, {}, 0, {}, \
         (void *) Draw_{}.vertices);\n",
        record.vertices.width, count, id
    ))?;
    frame.limare(format_args!(
        "\tlimare_attribute_pointer(state, \"aColor\", LIMARE_ATTRIB_U8N, {}, 0, {}, \
         (void *) Draw_{}.colors);\n",
        record.colors.width, count, id
    ))?;
    for (unit, coords) in record.coords.iter().enumerate() {
        frame.limare(format_args!(
            "\tlimare_attribute_pointer(state, \"aTexCoord{u}\", LIMARE_ATTRIB_FLOAT, {}, 0, {}, \
             (void *) Draw_{}.coords[{u}]);\n",
            coords.width,
            count,
            id,
            u = unit
        ))?;
        let handle = match textures.get(unit) {
            Some(Some(serial)) => format!("Texture_{}.handle", serial),
            _ => "0".to_string(),
        };
        frame.limare(format_args!(
            "\tlimare_texture_attach(state, \"uTexture{}\", {});\n",
            unit, handle
        ))?;
    }
    frame.limare(format_args!(
        "\tlimare_draw_elements(state, {}, {}, (void *) Draw_{}.indices, {});\n",
        symbol::enum_name(record.mode),
        record.indices.len(),
        id,
        symbol::enum_name(gl::UNSIGNED_SHORT)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordConfig;
    use crate::consts;
    use crate::files::Memory;
    use gleam::gl::GLvoid;

    /// Vertex arrays laid out the way the renderer lays them out: positions
    /// padded to four floats, one texture coordinate pair and one RGBA
    /// color per vertex.
    struct Arrays {
        positions: Vec<f32>,
        coords: Vec<f32>,
        colors: Vec<u8>,
    }

    impl Arrays {
        fn new(count: usize) -> Arrays {
            Arrays {
                positions: (0..count * 4).map(|i| i as f32).collect(),
                coords: (0..count * 2).map(|i| i as f32 / 8.0).collect(),
                colors: (0..count * 4).map(|i| i as u8).collect(),
            }
        }

        /// A state with colors and unit 0 fully set up.
        fn single_texture(&self) -> StateTracker {
            let mut state = StateTracker::default();
            state.set_capability(gl::TEXTURE_2D, true);
            state.bind_texture(7);
            state.set_client_state(consts::COLOR_ARRAY, true).unwrap();
            state.set_client_state(consts::TEXTURE_COORD_ARRAY, true).unwrap();
            state
                .set_pointer(ArrayKind::Color, 4, gl::UNSIGNED_BYTE, 0, self.colors.as_ptr() as *const GLvoid)
                .unwrap();
            state
                .set_pointer(ArrayKind::TexCoord, 2, gl::FLOAT, 0, self.coords.as_ptr() as *const GLvoid)
                .unwrap();
            state
                .set_pointer(ArrayKind::Vertex, 3, gl::FLOAT, 16, self.positions.as_ptr() as *const GLvoid)
                .unwrap();
            state
        }
    }

    fn recording() -> (Memory, Recorder) {
        let memory = Memory::new();
        let mut recorder = Recorder::new(Box::new(memory.clone()), RecordConfig::default()).unwrap();
        recorder.begin_frame().unwrap();
        (memory, recorder)
    }

    #[test]
    fn test_vertex_count() {
        assert_eq!(vertex_count(&[0, 2, 1, 2, 3, 1]), 4);
        assert_eq!(vertex_count(&[5]), 6);
        assert_eq!(vertex_count(&[]), 0);
    }

    #[test]
    fn test_select_program() {
        let arrays = Arrays::new(4);
        let mut state = arrays.single_texture();
        assert_eq!(select_program(&state, 0), Ok(Program::SingleTexture));

        // Unit 1 needs both its texture and its coordinates enabled.
        state.active_texture(gl::TEXTURE1).unwrap();
        state.set_capability(gl::TEXTURE_2D, true);
        assert_eq!(select_program(&state, 0), Ok(Program::SingleTexture));
        state.client_active_texture(gl::TEXTURE1).unwrap();
        state.set_client_state(consts::TEXTURE_COORD_ARRAY, true).unwrap();
        assert_eq!(select_program(&state, 0), Ok(Program::DualTexture));

        state.set_client_state(consts::COLOR_ARRAY, false).unwrap();
        assert_eq!(select_program(&state, 2), Err(Diagnostic::MissingColors { draw: 2 }));

        let mut state = arrays.single_texture();
        state.set_capability(gl::TEXTURE_2D, false);
        assert_eq!(select_program(&state, 5), Err(Diagnostic::MissingTexture { draw: 5 }));
    }

    #[test]
    fn test_capture() {
        let arrays = Arrays::new(4);
        let state = arrays.single_texture();
        let indices = [0, 2, 1, 2, 3, 1];
        let record = unsafe { capture(&state, 0, gl::TRIANGLES, &indices) }.unwrap();

        assert_eq!(record.vertex_count, 4);
        assert_eq!(record.colors.rows[1], vec![4, 5, 6, 7]);
        assert_eq!(record.coords.len(), 1);
        assert_eq!(record.coords[0].rows[3], vec![0.75, 0.875]);
        assert_eq!(record.vertices.width, 4);
        assert_eq!(record.vertices.rows[2], vec![8.0, 9.0, 10.0, 11.0]);
        assert_eq!(record.textures, vec![7]);
    }

    #[test]
    fn test_capture_missing_pointer() {
        let arrays = Arrays::new(2);
        let mut state = arrays.single_texture();
        state.end_draw();
        let result = unsafe { capture(&state, 3, gl::TRIANGLES, &[0, 1]) };
        assert_eq!(
            result.map(|_| ()),
            Err(Diagnostic::MissingPointer { draw: 3, kind: ArrayKind::TexCoord })
        );
    }

    #[test]
    fn test_draw_output() {
        let (memory, mut recorder) = recording();
        let mut diags = Diagnostics::default();
        let arrays = Arrays::new(2);
        let state = arrays.single_texture();

        unsafe { recorder.draw_elements(&state, gl::TRIANGLES, &[0, 1, 1], &mut diags) };
        recorder.end_frame().unwrap();

        let draws = memory.contents("frame_0001_draws.c").unwrap();
        assert!(draws.contains(
            "static const unsigned char Colors_0[2][4] = {\n\
             \t\t{0x00, 0x01, 0x02, 0x03},\n\
             \t\t{0x04, 0x05, 0x06, 0x07},\n\
             };\n"
        ));
        assert!(draws.contains(
            "static const float TextureCoordinates_0_0[2][2] = {\n\
             \t\t{0x0p+0, 0x1p-3},\n\
             \t\t{0x1p-2, 0x1.8p-2},\n\
             };\n"
        ));
        assert!(draws.contains("static const float Vertices_0[2][4] = {\n"));
        assert!(draws.contains(
            "static const unsigned short Indices_0[3] = {\n\
             \t\t0x0000, 0x0001, 0x0001,\n\
             };\n"
        ));
        assert!(draws.contains("\t.coords = { TextureCoordinates_0_0[0], NULL },\n"));
        assert!(draws.contains("\t.mode = GL_TRIANGLES,\n"));

        let header = memory.contents("frame_0001.h").unwrap();
        assert!(header.contains("extern struct draw Draw_0;\n"));

        // Texture 7 was never uploaded, so the draw can't name it.
        let main = memory.contents("frame_0001.c").unwrap();
        assert!(main.contains("\tdraw_single_texture(&Draw_0, NULL);\n"));
        assert_eq!(diags.take(), vec![Diagnostic::UnrecordedTexture { draw: 0, texture: 7 }]);

        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert!(limare.contains("limare_texture_attach(state, \"uTexture0\", 0);\n"));
        assert!(limare.contains(
            "\tlimare_draw_elements(state, GL_TRIANGLES, 3, (void *) Draw_0.indices, GL_UNSIGNED_SHORT);\n"
        ));
    }

    #[test]
    fn test_program_switch_once() {
        let (memory, mut recorder) = recording();
        let mut diags = Diagnostics::default();
        let arrays = Arrays::new(3);
        let mut state = arrays.single_texture();

        for _ in 0..2 {
            unsafe { recorder.draw_elements(&state, gl::TRIANGLES, &[0, 1, 2], &mut diags) };
            state.end_draw();
            state
                .set_pointer(ArrayKind::TexCoord, 2, gl::FLOAT, 0, arrays.coords.as_ptr() as *const GLvoid)
                .unwrap();
        }
        recorder.end_frame().unwrap();

        let main = memory.contents("frame_0001.c").unwrap();
        assert_eq!(main.matches("program_switch(").count(), 1);
        assert!(main.contains("draw_single_texture(&Draw_1, NULL);"));
        let limare = memory.contents("frame_0001_limare.c").unwrap();
        assert_eq!(limare.matches("limare_program_current(").count(), 1);
    }

    #[test]
    fn test_gated_draw_writes_nothing() {
        let (memory, mut recorder) = recording();
        let mut diags = Diagnostics::default();
        let arrays = Arrays::new(3);
        let mut state = arrays.single_texture();
        state.set_client_state(consts::COLOR_ARRAY, false).unwrap();

        unsafe { recorder.draw_elements(&state, gl::TRIANGLES, &[0, 1, 2], &mut diags) };
        recorder.end_frame().unwrap();

        assert_eq!(diags.take(), vec![Diagnostic::MissingColors { draw: 0 }]);
        let draws = memory.contents("frame_0001_draws.c").unwrap();
        assert_eq!(draws, "#include \"frame_0001.h\"\n\n/* end of frame_0001_draws.c */\n");
        let main = memory.contents("frame_0001.c").unwrap();
        assert!(!main.contains("Draw_"));
    }
}
