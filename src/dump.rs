//! Formatting numeric arrays as C initializers.
//!
//! Everything the recorder dumps is meant to be diffed between frames and
//! between runs, so each kind of array has a fixed layout:
//!
//! - 32-bit words (texture texels) are written as `0x%08X`, four per row.
//!
//! - 16-bit indices are written as `0x%04X`, eight per row.
//!
//! - Vertex attributes are written one vertex per row, bytes as `0x%02X`
//!   and floats as C99 hexadecimal floating-point literals, which survive
//!   the trip through the C compiler bit-for-bit.

use std::convert::TryInto;
use std::io::{self, Write};

/// Write `data` as comma-terminated items, `per_row` to a line, each line
/// indented by two tabs. A partial last row still ends with a newline.
fn write_packed<W, T, F>(out: &mut W, data: &[T], per_row: usize, mut item: F) -> io::Result<()>
where
    W: Write + ?Sized,
    F: FnMut(&mut W, &T) -> io::Result<()>,
{
    for row in data.chunks(per_row) {
        out.write_all(b"\t\t")?;
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            item(out, value)?;
            out.write_all(b",")?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write texel words, four to a row.
pub fn write_words<W: Write + ?Sized>(out: &mut W, words: &[u32]) -> io::Result<()> {
    write_packed(out, words, 4, |out, word| write!(out, "0x{:08X}", word))
}

/// Write element indices, eight to a row.
pub fn write_indices<W: Write + ?Sized>(out: &mut W, indices: &[u16]) -> io::Result<()> {
    write_packed(out, indices, 8, |out, index| write!(out, "0x{:04X}", index))
}

/// Write floats as hex literals, four to a row, as for a 4x4 matrix.
pub fn write_matrix<W: Write + ?Sized>(out: &mut W, values: &[f32]) -> io::Result<()> {
    write_packed(out, values, 4, |out, &value| out.write_all(hex_float(value).as_bytes()))
}

/// Write one `{...}` row of bytes per vertex.
pub fn write_byte_rows<W: Write + ?Sized>(out: &mut W, rows: &[Vec<u8>]) -> io::Result<()> {
    for row in rows {
        let items: Vec<String> = row.iter().map(|b| format!("0x{:02X}", b)).collect();
        writeln!(out, "\t\t{{{}}},", items.join(", "))?;
    }
    Ok(())
}

/// Write one `{...}` row of floats per vertex.
pub fn write_float_rows<W: Write + ?Sized>(out: &mut W, rows: &[Vec<f32>]) -> io::Result<()> {
    for row in rows {
        let items: Vec<String> = row.iter().map(|&f| hex_float(f)).collect();
        writeln!(out, "\t\t{{{}}},", items.join(", "))?;
    }
    Ok(())
}

/// Format `value` as a C99 hexadecimal floating-point literal, the way
/// `printf("%a")` does: `0x1.8p+1` for 3.0, `0x0p+0` for zero.
pub fn hex_float(value: f32) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-INFINITY" } else { "INFINITY" }.to_string();
    }

    let bits = value.to_bits();
    let sign = if bits >> 31 != 0 { "-" } else { "" };
    let biased = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x7f_ffff;

    if biased == 0 && mantissa == 0 {
        return format!("{}0x0p+0", sign);
    }

    // Subnormals have an implicit leading zero and a fixed exponent.
    let (lead, exponent) = if biased == 0 {
        (0, -126)
    } else {
        (1, biased - 127)
    };

    // Shift the 23-bit fraction up to 24 bits, six hex digits, and drop
    // trailing zero digits.
    let digits = format!("{:06x}", mantissa << 1);
    let digits = digits.trim_end_matches('0');
    if digits.is_empty() {
        format!("{}0x{}p{:+}", sign, lead, exponent)
    } else {
        format!("{}0x{}.{}p{:+}", sign, lead, digits, exponent)
    }
}

/// Gather `count` rows of `width` elements of `size` bytes each from
/// `bytes`, where row `i` starts at byte `i * stride`.
///
/// A zero `stride` means the rows are tightly packed. Rows that would run
/// past the end of `bytes` are cut short rather than read out of bounds.
fn gather<T, F>(bytes: &[u8], count: usize, stride: usize, width: usize, size: usize, decode: F) -> Vec<Vec<T>>
where
    F: Fn(&[u8]) -> T,
{
    let stride = if stride == 0 { width * size } else { stride };
    (0..count)
        .map(|i| {
            let start = i * stride;
            (0..width)
                .filter_map(|j| bytes.get(start + j * size..start + (j + 1) * size))
                .map(|elt| decode(elt))
                .collect()
        })
        .collect()
}

/// Gather per-vertex byte tuples, as for `GL_UNSIGNED_BYTE` colors.
pub fn gather_bytes(bytes: &[u8], count: usize, stride: usize, width: usize) -> Vec<Vec<u8>> {
    gather(bytes, count, stride, width, 1, |elt| elt[0])
}

/// Gather per-vertex float tuples, as for `GL_FLOAT` coordinates.
pub fn gather_floats(bytes: &[u8], count: usize, stride: usize, width: usize) -> Vec<Vec<f32>> {
    gather(bytes, count, stride, width, 4, |elt| {
        // `gather` only hands us four-byte slices.
        f32::from_ne_bytes(elt.try_into().unwrap_or([0; 4]))
    })
}

/// Reinterpret a byte buffer as native-endian 32-bit words. Trailing bytes
/// that don't fill a word are dropped.
pub fn bytes_to_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// The number of bytes one needs to read `count` rows of `width` elements of
/// `size` bytes, spaced `stride` bytes apart.
pub fn span(count: usize, stride: usize, width: usize, size: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let row = width * size;
    let stride = if stride == 0 { row } else { stride };
    (count - 1) * stride + row
}

#[test]
fn test_write_words() {
    let mut buf = vec![];
    write_words(&mut buf, &[0xdeadbeef, 1, 2, 3, 0xff]).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "\t\t0xDEADBEEF, 0x00000001, 0x00000002, 0x00000003,\n\
         \t\t0x000000FF,\n"
    );
}

#[test]
fn test_write_indices() {
    let mut buf = vec![];
    write_indices(&mut buf, &[0, 1, 2, 2, 1, 3, 4, 5, 6]).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "\t\t0x0000, 0x0001, 0x0002, 0x0002, 0x0001, 0x0003, 0x0004, 0x0005,\n\
         \t\t0x0006,\n"
    );

    let mut buf = vec![];
    write_indices(&mut buf, &[]).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn test_write_matrix() {
    let mut buf = vec![];
    let mut identity = [0.0; 16];
    for i in 0..4 {
        identity[i * 5] = 1.0;
    }
    write_matrix(&mut buf, &identity).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "\t\t0x1p+0, 0x0p+0, 0x0p+0, 0x0p+0,\n\
         \t\t0x0p+0, 0x1p+0, 0x0p+0, 0x0p+0,\n\
         \t\t0x0p+0, 0x0p+0, 0x1p+0, 0x0p+0,\n\
         \t\t0x0p+0, 0x0p+0, 0x0p+0, 0x1p+0,\n"
    );
}

#[test]
fn test_hex_float() {
    assert_eq!(hex_float(0.0), "0x0p+0");
    assert_eq!(hex_float(-0.0), "-0x0p+0");
    assert_eq!(hex_float(1.0), "0x1p+0");
    assert_eq!(hex_float(3.0), "0x1.8p+1");
    assert_eq!(hex_float(-0.5), "-0x1p-1");
    assert_eq!(hex_float(0.1), "0x1.99999ap-4");
    assert_eq!(hex_float(640.0), "0x1.4p+9");
    assert_eq!(hex_float(f32::from_bits(1)), "0x0.000002p-126");
    assert_eq!(hex_float(f32::INFINITY), "INFINITY");
}

#[test]
fn test_gather() {
    // Two floats of interest in each 16-byte vertex.
    let data: Vec<f32> = vec![1.0, 2.0, 9.0, 9.0, 3.0, 4.0, 9.0, 9.0];
    let bytes: Vec<u8> = data.iter().flat_map(|f| f.to_ne_bytes().to_vec()).collect();
    assert_eq!(gather_floats(&bytes, 2, 16, 2), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(gather_floats(&bytes, 4, 0, 2)[3], vec![9.0, 9.0]);

    let colors = [1, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(gather_bytes(&colors, 2, 0, 4), vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);

    // Short buffers produce short rows, not panics.
    assert_eq!(gather_bytes(&colors, 3, 0, 4)[2], Vec::<u8>::new());
}

#[test]
fn test_span() {
    assert_eq!(span(0, 16, 4, 4), 0);
    assert_eq!(span(1, 16, 2, 4), 8);
    assert_eq!(span(3, 16, 4, 4), 48);
    assert_eq!(span(3, 0, 4, 1), 12);
}
