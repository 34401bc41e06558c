//! Tracking the GL state the recorder needs to interpret later calls.
//!
//! The fixed-function API is stateful: `glDrawElements` carries only its
//! indices, and everything else about the draw (which arrays are enabled,
//! where they point, which textures are bound) was established by earlier
//! calls. This module watches those calls and keeps just enough of that
//! state to describe each draw completely.
//!
//! We only track two texture units, since that's all the renderer ever
//! uses and all the limare driver supports.

use gleam::gl::{self, GLenum, GLint, GLsizei, GLuint, GLvoid};

use crate::consts;
use crate::diag::{ArrayKind, Diagnostic};

/// The number of texture units we track.
pub const TEXTURE_UNIT_COUNT: usize = 2;

/// Where a client array lives, as passed to `glColorPointer` and friends.
///
/// This is a raw pointer into the renderer's own vertex buffers. We never
/// dereference it except while handling the `glDrawElements` call that
/// consumes it, whose caller promises it is still valid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArrayPointer {
    /// Components per vertex.
    pub size: GLint,

    /// Bytes from one vertex to the next, or zero for tightly packed.
    pub stride: GLsizei,

    pub ptr: *const GLvoid,
}

/// What we know about one texture unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureUnit {
    /// Whether `GL_TEXTURE_2D` is enabled on this unit.
    pub enabled: bool,

    /// The texture bound to this unit's `GL_TEXTURE_2D` target.
    pub bound: GLuint,

    /// Whether this unit's `GL_TEXTURE_COORD_ARRAY` is enabled.
    pub coords_enabled: bool,

    /// This unit's texture coordinates, until the next draw consumes them.
    pub coords: Option<ArrayPointer>,
}

impl TextureUnit {
    /// True if a draw would sample this unit with coordinates from an array.
    pub fn is_live(&self) -> bool {
        self.enabled && self.coords_enabled
    }
}

/// Progress through the `glMatrixMode(GL_PROJECTION)`, `glLoadIdentity`,
/// `glOrthof`, `glMatrixMode(GL_MODELVIEW)` sequence the renderer uses to set
/// up 2D drawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrthoSetup {
    Idle,
    Projection,
    Identity,
    Ortho,
}

/// The matrix mode, and our check on orthographic setup.
///
/// The check only ever produces diagnostics. It never changes what gets
/// recorded or passed to the driver.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixState {
    pub mode: GLenum,
    pub ortho: OrthoSetup,
}

impl Default for MatrixState {
    fn default() -> MatrixState {
        MatrixState {
            mode: consts::MODELVIEW,
            ortho: OrthoSetup::Idle,
        }
    }
}

impl MatrixState {
    pub fn matrix_mode(&mut self, mode: GLenum) -> Result<(), Diagnostic> {
        let previous = self.ortho;
        self.mode = mode;
        self.ortho = if mode == consts::PROJECTION {
            OrthoSetup::Projection
        } else {
            OrthoSetup::Idle
        };

        if mode == consts::MODELVIEW && previous == OrthoSetup::Identity {
            return Err(Diagnostic::MalformedOrtho {
                detail: "projection left as identity, glOrthof never called",
            });
        }
        Ok(())
    }

    pub fn load_identity(&mut self) {
        if self.mode == consts::PROJECTION {
            self.ortho = OrthoSetup::Identity;
        }
    }

    pub fn load_matrix(&mut self) {
        if self.mode == consts::PROJECTION {
            // A full projection matrix, not an orthographic setup.
            self.ortho = OrthoSetup::Idle;
        }
    }

    pub fn orthof(&mut self) -> Result<(), Diagnostic> {
        let previous = self.ortho;
        if self.mode != consts::PROJECTION {
            self.ortho = OrthoSetup::Idle;
            return Err(Diagnostic::MalformedOrtho {
                detail: "glOrthof applied outside the projection matrix",
            });
        }

        self.ortho = OrthoSetup::Ortho;
        if previous != OrthoSetup::Identity {
            return Err(Diagnostic::MalformedOrtho {
                detail: "glOrthof without a preceding glLoadIdentity",
            });
        }
        Ok(())
    }
}

/// The inferred GL state.
#[derive(Clone, Debug)]
pub struct StateTracker {
    /// The unit selected by `glActiveTexture`.
    pub active_unit: usize,

    /// The unit selected by `glClientActiveTexture`.
    pub client_unit: usize,

    pub units: [TextureUnit; TEXTURE_UNIT_COUNT],

    /// Whether `GL_COLOR_ARRAY` is enabled.
    pub color_enabled: bool,
    pub colors: Option<ArrayPointer>,

    /// The vertex array has no enable flag of its own: once pointed, it's
    /// live.
    pub vertices: Option<ArrayPointer>,

    pub matrix: MatrixState,
}

impl Default for StateTracker {
    fn default() -> StateTracker {
        StateTracker {
            active_unit: 0,
            client_unit: 0,
            units: Default::default(),
            color_enabled: false,
            colors: None,
            vertices: None,
            matrix: MatrixState::default(),
        }
    }
}

/// Map a `GL_TEXTUREn` token to a unit index we track.
fn unit_index(function: &'static str, unit: GLenum) -> Result<usize, Diagnostic> {
    match unit.checked_sub(gl::TEXTURE0) {
        Some(index) if (index as usize) < TEXTURE_UNIT_COUNT => Ok(index as usize),
        _ => Err(Diagnostic::UnitOutOfRange { function, unit }),
    }
}

impl StateTracker {
    pub fn active_texture(&mut self, unit: GLenum) -> Result<(), Diagnostic> {
        self.active_unit = unit_index("glActiveTexture", unit)?;
        Ok(())
    }

    pub fn client_active_texture(&mut self, unit: GLenum) -> Result<(), Diagnostic> {
        self.client_unit = unit_index("glClientActiveTexture", unit)?;
        Ok(())
    }

    /// Note `glEnable` or `glDisable` of `cap`. Return true if this was a
    /// texture-unit capability we track.
    pub fn set_capability(&mut self, cap: GLenum, enabled: bool) -> bool {
        if cap != gl::TEXTURE_2D {
            return false;
        }
        self.units[self.active_unit].enabled = enabled;
        true
    }

    /// Note `glEnableClientState` or `glDisableClientState`.
    ///
    /// Disabling an array forgets its pointer too.
    pub fn set_client_state(&mut self, array: GLenum, enabled: bool) -> Result<(), Diagnostic> {
        match array {
            consts::COLOR_ARRAY => {
                self.color_enabled = enabled;
                if !enabled {
                    self.colors = None;
                }
            }
            consts::TEXTURE_COORD_ARRAY => {
                let unit = &mut self.units[self.client_unit];
                unit.coords_enabled = enabled;
                if !enabled {
                    unit.coords = None;
                }
            }
            consts::VERTEX_ARRAY => (),
            _ => {
                let function = if enabled {
                    "glEnableClientState"
                } else {
                    "glDisableClientState"
                };
                return Err(Diagnostic::UnknownArray { function, array });
            }
        }
        Ok(())
    }

    /// Note a `glColorPointer`, `glTexCoordPointer` or `glVertexPointer`.
    ///
    /// Colors must be unsigned bytes and everything else floats; anything
    /// else is refused and leaves the state as it was.
    pub fn set_pointer(
        &mut self,
        kind: ArrayKind,
        size: GLint,
        type_: GLenum,
        stride: GLsizei,
        ptr: *const GLvoid,
    ) -> Result<(), Diagnostic> {
        let expected = match kind {
            ArrayKind::Color => gl::UNSIGNED_BYTE,
            ArrayKind::TexCoord | ArrayKind::Vertex => gl::FLOAT,
        };
        if type_ != expected {
            return Err(Diagnostic::UnsupportedArrayType { kind, type_ });
        }

        let pointer = Some(ArrayPointer { size, stride, ptr });
        match kind {
            ArrayKind::Color => self.colors = pointer,
            ArrayKind::TexCoord => self.units[self.client_unit].coords = pointer,
            ArrayKind::Vertex => self.vertices = pointer,
        }
        Ok(())
    }

    /// Bind `texture` to the active unit. Return the texture previously
    /// bound there.
    pub fn bind_texture(&mut self, texture: GLuint) -> GLuint {
        std::mem::replace(&mut self.units[self.active_unit].bound, texture)
    }

    /// The texture bound to the active unit.
    pub fn bound_texture(&self) -> GLuint {
        self.units[self.active_unit].bound
    }

    /// Forget the references a draw has consumed.
    ///
    /// Texture coordinate pointers are set afresh for every draw; enable
    /// flags persist until explicitly toggled.
    pub fn end_draw(&mut self) {
        for unit in &mut self.units {
            unit.coords = None;
        }
    }
}

#[test]
fn test_active_texture_range() {
    let mut state = StateTracker::default();
    assert_eq!(state.active_texture(gl::TEXTURE1), Ok(()));
    assert_eq!(state.active_unit, 1);

    // Out-of-range units leave the tracked unit alone.
    assert_eq!(
        state.active_texture(gl::TEXTURE2),
        Err(Diagnostic::UnitOutOfRange { function: "glActiveTexture", unit: gl::TEXTURE2 })
    );
    assert_eq!(state.active_unit, 1);

    assert!(state.client_active_texture(0x1234).is_err());
    assert_eq!(state.client_unit, 0);
}

#[test]
fn test_capabilities_follow_active_unit() {
    let mut state = StateTracker::default();
    assert!(state.set_capability(gl::TEXTURE_2D, true));
    state.active_texture(gl::TEXTURE1).unwrap();
    assert!(state.set_capability(gl::TEXTURE_2D, true));
    assert!(state.set_capability(gl::TEXTURE_2D, false));
    assert!(!state.set_capability(gl::BLEND, true));

    assert!(state.units[0].enabled);
    assert!(!state.units[1].enabled);
}

#[test]
fn test_client_state() {
    let mut state = StateTracker::default();
    let data = [0_f32; 8];
    let ptr = data.as_ptr() as *const GLvoid;

    state.set_client_state(consts::COLOR_ARRAY, true).unwrap();
    state.set_pointer(ArrayKind::Color, 4, gl::UNSIGNED_BYTE, 0, ptr).unwrap();
    assert!(state.color_enabled);
    assert!(state.colors.is_some());

    state.client_active_texture(gl::TEXTURE1).unwrap();
    state.set_client_state(consts::TEXTURE_COORD_ARRAY, true).unwrap();
    assert!(state.units[1].coords_enabled);
    assert!(!state.units[0].coords_enabled);

    state.set_client_state(consts::VERTEX_ARRAY, true).unwrap();
    assert_eq!(
        state.set_client_state(consts::NORMAL_ARRAY, true),
        Err(Diagnostic::UnknownArray { function: "glEnableClientState", array: consts::NORMAL_ARRAY })
    );

    state.set_client_state(consts::COLOR_ARRAY, false).unwrap();
    assert!(!state.color_enabled);
    assert!(state.colors.is_none());
}

#[test]
fn test_pointer_type_checks() {
    let mut state = StateTracker::default();
    let data = [0_f32; 8];
    let ptr = data.as_ptr() as *const GLvoid;

    assert_eq!(
        state.set_pointer(ArrayKind::Vertex, 4, gl::SHORT, 16, ptr),
        Err(Diagnostic::UnsupportedArrayType { kind: ArrayKind::Vertex, type_: gl::SHORT })
    );
    assert!(state.vertices.is_none());

    assert!(state.set_pointer(ArrayKind::Color, 4, gl::FLOAT, 0, ptr).is_err());
    assert!(state.colors.is_none());

    state.set_pointer(ArrayKind::Vertex, 4, gl::FLOAT, 16, ptr).unwrap();
    assert_eq!(state.vertices, Some(ArrayPointer { size: 4, stride: 16, ptr }));

    state.set_pointer(ArrayKind::TexCoord, 2, gl::FLOAT, 8, ptr).unwrap();
    assert!(state.units[0].coords.is_some());
    state.end_draw();
    assert!(state.units[0].coords.is_none());
    assert!(state.vertices.is_some());
}

#[test]
fn test_bind_texture() {
    let mut state = StateTracker::default();
    assert_eq!(state.bind_texture(7), 0);
    state.active_texture(gl::TEXTURE1).unwrap();
    assert_eq!(state.bind_texture(9), 0);
    assert_eq!(state.bind_texture(10), 9);
    assert_eq!(state.units[0].bound, 7);
    assert_eq!(state.bound_texture(), 10);
}

#[test]
fn test_ortho_setup() {
    let mut matrix = MatrixState::default();

    // The well-formed sequence.
    matrix.matrix_mode(consts::PROJECTION).unwrap();
    matrix.load_identity();
    matrix.orthof().unwrap();
    matrix.matrix_mode(consts::MODELVIEW).unwrap();
    assert_eq!(matrix.ortho, OrthoSetup::Idle);

    // A perspective projection is fine too.
    matrix.matrix_mode(consts::PROJECTION).unwrap();
    matrix.load_matrix();
    matrix.matrix_mode(consts::MODELVIEW).unwrap();

    // Identity loaded, but never made orthographic.
    matrix.matrix_mode(consts::PROJECTION).unwrap();
    matrix.load_identity();
    assert!(matrix.matrix_mode(consts::MODELVIEW).is_err());

    // Ortho without a fresh identity.
    matrix.matrix_mode(consts::PROJECTION).unwrap();
    assert!(matrix.orthof().is_err());

    // Ortho on the wrong matrix.
    matrix.matrix_mode(consts::MODELVIEW).unwrap();
    matrix.load_identity();
    assert!(matrix.orthof().is_err());
}
