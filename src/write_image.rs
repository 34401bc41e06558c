//! Writing recorded textures as PNG files, for looking at.

use image::png::PngEncoder;
use image::ColorType;
use std::io::{self, Write};

use crate::diag::Error;

/// Write `width` by `height` RGBA texels to `out` as a PNG image.
///
/// The texels are words exactly as the renderer uploaded them, so their
/// bytes in memory order are red, green, blue and alpha.
pub fn write_image<W: Write>(out: W, texels: &[u32], width: u32, height: u32) -> Result<(), Error> {
    let len = width as usize * height as usize;
    if texels.len() < len {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "glimp-replay: write_image: {} texels is too few for a {}x{} image",
                texels.len(),
                width,
                height
            ),
        )));
    }

    let bytes: Vec<u8> = texels[..len].iter().flat_map(|texel| texel.to_ne_bytes().to_vec()).collect();
    PngEncoder::new(out)
        .encode(&bytes, width, height, ColorType::Rgba8)
        .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::Other, err.to_string())))
}

#[test]
fn test_write_image() {
    let mut png = vec![];
    write_image(&mut png, &[0xff0000ff; 4], 2, 2).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    assert!(write_image(vec![], &[0; 3], 2, 2).is_err());
}
