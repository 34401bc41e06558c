//! Collecting texture uploads into complete texture records.
//!
//! A texture arrives in pieces: `glBindTexture`, a `glTexImage2D` for each
//! mipmap level, and some `glTexParameteri` calls, in whatever order the
//! renderer likes. We gather the pieces into a `TextureRecord` and hand it
//! back to the caller to be written out once the renderer has moved on to
//! another texture, which is the earliest point we can be sure it's done.

use gleam::gl::{self, GLenum, GLint, GLsizei, GLuint};

use crate::diag::{Diagnostic, Diagnostics};
use crate::dump;

/// The number of mipmap levels a texture record can hold.
pub const TEXTURE_LEVEL_COUNT: usize = 12;

/// Sampling parameters, as set by `glTexParameteri`.
///
/// These start out with GL's own defaults.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parameters {
    pub min_filter: GLint,
    pub mag_filter: GLint,
    pub wrap_s: GLint,
    pub wrap_t: GLint,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            min_filter: gl::NEAREST_MIPMAP_LINEAR as GLint,
            mag_filter: gl::LINEAR as GLint,
            wrap_s: gl::REPEAT as GLint,
            wrap_t: gl::REPEAT as GLint,
        }
    }
}

impl Parameters {
    fn set(&mut self, pname: GLenum, param: GLint) -> Result<(), Diagnostic> {
        match pname {
            gl::TEXTURE_MIN_FILTER => self.min_filter = param,
            gl::TEXTURE_MAG_FILTER => self.mag_filter = param,
            gl::TEXTURE_WRAP_S => self.wrap_s = param,
            gl::TEXTURE_WRAP_T => self.wrap_t = param,
            _ => return Err(Diagnostic::UnknownTexParameter { pname }),
        }
        Ok(())
    }
}

/// One mipmap level's image.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub level: usize,
    pub width: GLsizei,
    pub height: GLsizei,

    /// The texels, one RGBA word each, or `None` if the level was allocated
    /// without initial contents.
    pub texels: Option<Vec<u32>>,
}

/// A texture as uploaded by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRecord {
    /// The renderer's name for the texture.
    pub id: GLuint,

    /// The internal format passed for level 0.
    pub format: GLenum,

    /// Levels in the order they were first uploaded. Level 0 is always
    /// present.
    pub levels: Vec<Level>,

    pub parameters: Parameters,
}

impl TextureRecord {
    pub fn base(&self) -> &Level {
        &self.levels[0]
    }
}

/// Everything `glTexImage2D` tells us about an image.
#[derive(Copy, Clone, Debug)]
pub struct Image<'a> {
    pub level: GLint,
    pub internal_format: GLint,
    pub width: GLsizei,
    pub height: GLsizei,
    pub format: GLenum,
    pub pixel_type: GLenum,
    pub pixels: Option<&'a [u8]>,
}

/// The state machine assembling texture records.
#[derive(Debug, Default)]
pub struct TextureCollector {
    /// The record under construction, if any.
    current: Option<TextureRecord>,

    /// Parameters set on a texture before its level 0 arrived.
    pending: Option<(GLuint, Parameters)>,
}

impl TextureCollector {
    /// The id of the texture under construction.
    pub fn current_id(&self) -> Option<GLuint> {
        self.current.as_ref().map(|record| record.id)
    }

    /// Note a `glBindTexture`. If this switches away from the texture under
    /// construction, return its finished record.
    pub fn bind(&mut self, texture: GLuint, diags: &mut Diagnostics) -> Option<TextureRecord> {
        match self.current_id() {
            Some(current) if current != texture => {
                if texture == 0 {
                    diags.report(Diagnostic::TextureStillBound { texture: current });
                }
                self.current.take()
            }
            _ => None,
        }
    }

    /// Note a `glDeleteTextures`. If it deletes the texture under
    /// construction, return its finished record.
    pub fn delete(&mut self, textures: &[GLuint]) -> Option<TextureRecord> {
        if let Some((pending, _)) = self.pending {
            if textures.contains(&pending) {
                self.pending = None;
            }
        }
        match self.current_id() {
            Some(current) if textures.contains(&current) => self.current.take(),
            _ => None,
        }
    }

    /// Note a `glTexImage2D` on `texture`, the texture bound to the active
    /// unit.
    ///
    /// A level 0 image starts a new record, so if one was already under
    /// construction, it is returned finished.
    pub fn image(
        &mut self,
        texture: GLuint,
        image: &Image,
        diags: &mut Diagnostics,
    ) -> Option<TextureRecord> {
        if image.level < 0 || image.level as usize >= TEXTURE_LEVEL_COUNT {
            diags.report(Diagnostic::TooManyLevels { texture, level: image.level });
            return None;
        }
        let level = image.level as usize;

        if (image.format, image.pixel_type) != (gl::RGBA, gl::UNSIGNED_BYTE) {
            diags.report(Diagnostic::UnsupportedPixelFormat {
                texture,
                format: image.format,
                type_: image.pixel_type,
            });
            return None;
        }

        let texels = image.pixels.map(|pixels| {
            let len = (image.width.max(0) as usize) * (image.height.max(0) as usize) * 4;
            dump::bytes_to_words(&pixels[..len.min(pixels.len())])
        });
        let entry = Level { level, width: image.width, height: image.height, texels };

        if level == 0 {
            let mut format = image.internal_format as GLenum;
            if format == gl::RGB {
                log::warn!("texture {} is flagged as an RGB texture, recording as RGBA", texture);
                format = gl::RGBA;
            }
            let parameters = match self.pending.take() {
                Some((id, parameters)) if id == texture => parameters,
                _ => Parameters::default(),
            };
            let finished = self.current.take();
            self.current = Some(TextureRecord {
                id: texture,
                format,
                levels: vec![entry],
                parameters,
            });
            return finished;
        }

        match self.current.as_mut() {
            Some(record) if record.id == texture => {
                match record.levels.iter_mut().find(|l| l.level == level) {
                    Some(existing) => *existing = entry,
                    None => record.levels.push(entry),
                }
            }
            _ => diags.report(Diagnostic::LevelWithoutTexture { texture, level: image.level }),
        }
        None
    }

    /// Note a `glTexParameteri` on `texture`. The last value set before the
    /// record is finished wins.
    pub fn parameter(
        &mut self,
        texture: GLuint,
        pname: GLenum,
        param: GLint,
        diags: &mut Diagnostics,
    ) {
        let parameters = match self.current.as_mut() {
            Some(record) if record.id == texture => &mut record.parameters,
            _ => {
                if self.pending.map_or(true, |(id, _)| id != texture) {
                    self.pending = Some((texture, Parameters::default()));
                }
                match self.pending.as_mut() {
                    Some((_, parameters)) => parameters,
                    None => return,
                }
            }
        };
        if let Err(diagnostic) = parameters.set(pname, param) {
            diags.report(diagnostic);
        }
    }
}

#[cfg(test)]
fn rgba(level: GLint, width: GLsizei, height: GLsizei, pixels: &[u8]) -> Image {
    Image {
        level,
        internal_format: gl::RGBA as GLint,
        width,
        height,
        format: gl::RGBA,
        pixel_type: gl::UNSIGNED_BYTE,
        pixels: Some(pixels),
    }
}

#[test]
fn test_finalize_on_bind() {
    let mut collector = TextureCollector::default();
    let mut diags = Diagnostics::default();
    let base = [0xff_u8; 16];
    let mip = [0x11_u8; 4];

    assert_eq!(collector.bind(5, &mut diags), None);
    assert_eq!(collector.image(5, &rgba(0, 2, 2, &base), &mut diags), None);
    assert_eq!(collector.image(5, &rgba(1, 1, 1, &mip), &mut diags), None);
    collector.parameter(5, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_NEAREST as GLint, &mut diags);

    // Rebinding the same texture finishes nothing.
    assert_eq!(collector.bind(5, &mut diags), None);

    let record = collector.bind(6, &mut diags).expect("texture 5 should be finished");
    assert_eq!(record.id, 5);
    assert_eq!(record.levels.len(), 2);
    assert_eq!(record.levels[1].texels, Some(vec![0x11111111]));
    assert_eq!(record.parameters.min_filter, gl::LINEAR_MIPMAP_NEAREST as GLint);
    assert_eq!(record.parameters.mag_filter, gl::LINEAR as GLint);
    assert_eq!(collector.current_id(), None);
    assert_eq!(diags.take(), vec![]);
}

#[test]
fn test_parameters_before_image() {
    let mut collector = TextureCollector::default();
    let mut diags = Diagnostics::default();

    collector.parameter(3, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint, &mut diags);
    collector.image(3, &rgba(0, 1, 1, &[1, 2, 3, 4]), &mut diags);
    let record = collector.delete(&[3]).unwrap();
    assert_eq!(record.parameters.wrap_s, gl::CLAMP_TO_EDGE as GLint);

    collector.parameter(3, 0x1234, 0, &mut diags);
    assert_eq!(diags.take(), vec![Diagnostic::UnknownTexParameter { pname: 0x1234 }]);
}

#[test]
fn test_bind_zero_mid_construction() {
    let mut collector = TextureCollector::default();
    let mut diags = Diagnostics::default();

    collector.image(8, &rgba(0, 1, 1, &[0; 4]), &mut diags);
    let record = collector.bind(0, &mut diags);
    assert_eq!(record.map(|r| r.id), Some(8));
    assert_eq!(diags.take(), vec![Diagnostic::TextureStillBound { texture: 8 }]);
}

#[test]
fn test_level_errors() {
    let mut collector = TextureCollector::default();
    let mut diags = Diagnostics::default();

    collector.image(2, &rgba(3, 1, 1, &[0; 4]), &mut diags);
    collector.image(2, &rgba(12, 1, 1, &[0; 4]), &mut diags);
    let mut rgb = rgba(0, 1, 1, &[0; 3]);
    rgb.format = gl::RGB;
    collector.image(2, &rgb, &mut diags);

    assert_eq!(
        diags.take(),
        vec![
            Diagnostic::LevelWithoutTexture { texture: 2, level: 3 },
            Diagnostic::TooManyLevels { texture: 2, level: 12 },
            Diagnostic::UnsupportedPixelFormat { texture: 2, format: gl::RGB, type_: gl::UNSIGNED_BYTE },
        ]
    );
    assert_eq!(collector.current_id(), None);
}

#[test]
fn test_reupload_finishes_previous() {
    let mut collector = TextureCollector::default();
    let mut diags = Diagnostics::default();

    collector.image(4, &rgba(0, 1, 1, &[0; 4]), &mut diags);
    let mut image = rgba(0, 1, 1, &[0; 4]);
    image.internal_format = gl::RGB as GLint;
    let finished = collector.image(4, &image, &mut diags).unwrap();
    assert_eq!(finished.format, gl::RGBA);
    assert_eq!(collector.delete(&[4]).map(|r| r.format), Some(gl::RGBA));

    // Storage without contents.
    let mut empty = rgba(0, 8, 8, &[]);
    empty.pixels = None;
    collector.image(9, &empty, &mut diags);
    assert_eq!(collector.delete(&[9]).unwrap().base().texels, None);
}
