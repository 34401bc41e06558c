//! Errors and diagnostics.
//!
//! Almost nothing the recorder notices is allowed to stop the game: a draw
//! we can't make sense of is reported as a `Diagnostic` and simply left out
//! of the recording. `Error` is reserved for the things that really do fail,
//! like not being able to create the frame's output files.

use gleam::gl::{GLenum, GLint, GLuint};
use std::{fmt, io, path};

use crate::symbol;

/// A failure to produce a recording at all.
#[derive(Debug)]
pub enum Error {
    /// Writing to an already-open stream failed.
    Io(io::Error),

    /// One of a frame's output files couldn't be created.
    Open { path: path::PathBuf, source: io::Error },

    /// A recording configuration file couldn't be parsed.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(fmt, "glimp-replay: error writing recording: {}", err),
            Error::Open { path, source } => {
                write!(fmt, "glimp-replay: error opening {}: {}", path.display(), source)
            }
            Error::Config(msg) => write!(fmt, "glimp-replay: bad recording configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Open { source, .. } => Some(source),
            Error::Config(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// Which kind of client array a pointer call was describing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayKind {
    Color,
    TexCoord,
    Vertex,
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match self {
            ArrayKind::Color => "color",
            ArrayKind::TexCoord => "texture coordinate",
            ArrayKind::Vertex => "vertex",
        })
    }
}

/// Something the recorder had to skip or approximate.
///
/// None of these affect the call made to the real driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A pointer call passed a component type we don't dump.
    UnsupportedArrayType { kind: ArrayKind, type_: GLenum },

    /// `glDrawElements` was passed something other than 16-bit indices.
    UnsupportedIndexType { type_: GLenum },

    /// `glTexImage2D` data in a format/type pair we don't dump.
    UnsupportedPixelFormat { texture: GLuint, format: GLenum, type_: GLenum },

    /// A texture unit beyond the two we track.
    UnitOutOfRange { function: &'static str, unit: GLenum },

    /// A client array token we don't know.
    UnknownArray { function: &'static str, array: GLenum },

    /// A `glTexParameteri` name we don't record.
    UnknownTexParameter { pname: GLenum },

    /// A mipmap level at or beyond `TEXTURE_LEVEL_COUNT`.
    TooManyLevels { texture: GLuint, level: GLint },

    /// A mipmap level arrived without a level 0 to start the texture.
    LevelWithoutTexture { texture: GLuint, level: GLint },

    /// `glBindTexture(0)` while a texture was still being uploaded.
    TextureStillBound { texture: GLuint },

    /// A draw without the color array enabled.
    MissingColors { draw: usize },

    /// A draw without texture unit 0's coordinates and texture enabled.
    MissingTexture { draw: usize },

    /// A draw whose attributes were enabled but never pointed anywhere.
    MissingPointer { draw: usize, kind: ArrayKind },

    /// A draw refers to a texture we never saw finished.
    UnrecordedTexture { draw: usize, texture: GLuint },

    /// A call sequence setting up an orthographic projection went astray.
    MalformedOrtho { detail: &'static str },

    /// `glOrthof` with an empty volume.
    DegenerateOrtho,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use Diagnostic::*;
        match *self {
            UnsupportedArrayType { kind, type_ } => {
                write!(fmt, "unsupported {} array type {}", kind, symbol::enum_name(type_))
            }
            UnsupportedIndexType { type_ } => {
                write!(fmt, "unsupported index type {}", symbol::enum_name(type_))
            }
            UnsupportedPixelFormat { texture, format, type_ } => write!(
                fmt,
                "texture {}: unsupported pixel format {}/{}",
                texture,
                symbol::enum_name(format),
                symbol::enum_name(type_)
            ),
            UnitOutOfRange { function, unit } => {
                write!(fmt, "{}({}) not supported", function, symbol::enum_name(unit))
            }
            UnknownArray { function, array } => {
                write!(fmt, "{}: unknown array: 0x{:04X}", function, array)
            }
            UnknownTexParameter { pname } => write!(fmt, "unknown texture pname 0x{:04X}", pname),
            TooManyLevels { texture, level } => {
                write!(fmt, "too many levels assigned to texture {} (level {})", texture, level)
            }
            LevelWithoutTexture { texture, level } => {
                write!(fmt, "texture {}: level {} uploaded before level 0", texture, level)
            }
            TextureStillBound { texture } => {
                write!(fmt, "texture {} was still being uploaded when 0 was bound", texture)
            }
            MissingColors { draw } => write!(fmt, "draw {} has no colors", draw),
            MissingTexture { draw } => write!(fmt, "draw {} has no textures", draw),
            MissingPointer { draw, kind } => {
                write!(fmt, "draw {}: {} array enabled without a pointer", draw, kind)
            }
            UnrecordedTexture { draw, texture } => {
                write!(fmt, "draw {} uses texture {}, which was never recorded", draw, texture)
            }
            MalformedOrtho { detail } => write!(fmt, "malformed orthographic setup: {}", detail),
            DegenerateOrtho => fmt.write_str("glOrthof called with an empty volume"),
        }
    }
}

/// The per-frame collection of diagnostics.
///
/// Each report is logged as it arrives. The list itself is dropped at every
/// frame boundary, so a caller that never looks at it doesn't pay for it.
#[derive(Default, Debug)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.reported.push(diagnostic);
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.reported)
    }

    pub fn clear(&mut self) {
        self.reported.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported.iter()
    }
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::UnitOutOfRange { function: "glActiveTexture", unit: gleam::gl::TEXTURE2 };
    assert_eq!(diag.to_string(), "glActiveTexture(GL_TEXTURE2) not supported");

    let diag = Diagnostic::UnknownArray { function: "glEnableClientState", array: 0x8075 };
    assert_eq!(diag.to_string(), "glEnableClientState: unknown array: 0x8075");
}

#[test]
fn test_diagnostics_take() {
    let mut diags = Diagnostics::default();
    diags.report(Diagnostic::DegenerateOrtho);
    diags.report(Diagnostic::MissingColors { draw: 3 });
    assert_eq!(diags.iter().count(), 2);
    assert_eq!(diags.take(), vec![Diagnostic::DegenerateOrtho, Diagnostic::MissingColors { draw: 3 }]);
    assert_eq!(diags.iter().count(), 0);
}
