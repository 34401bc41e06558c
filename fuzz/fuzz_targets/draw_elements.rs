#![no_main]
use libfuzzer_sys::fuzz_target;

use gleam::gl::{self, GLvoid};
use glimp_replay::consts;
use glimp_replay::{Memory, Null, Qgl, RecordConfig, Stream};

fuzz_target!(|data: &[u8]| {
    // The first byte picks the primitive; the rest are little-endian
    // indices.
    let (mode, rest) = match data.split_first() {
        Some((&mode, rest)) => (mode as u32 % 7, rest),
        None => return,
    };
    let indices: Vec<u16> = rest
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let count = indices.iter().map(|&i| i as usize + 1).max().unwrap_or(0);

    let positions = vec![1.5_f32; count * 4];
    let coords = vec![0.5_f32; count * 2];
    let colors = vec![0x80_u8; count * 4];

    let memory = Memory::new();
    let mut qgl = Qgl::recording(Null::new(), Box::new(memory.clone()), RecordConfig::default())
        .expect("starting recording failed");
    qgl.draw_buffer(gl::BACK);
    qgl.enable(gl::TEXTURE_2D);
    qgl.enable_client_state(consts::COLOR_ARRAY);
    qgl.color_pointer(4, gl::UNSIGNED_BYTE, 0, colors.as_ptr() as *const GLvoid);
    qgl.enable_client_state(consts::TEXTURE_COORD_ARRAY);
    qgl.tex_coord_pointer(2, gl::FLOAT, 0, coords.as_ptr() as *const GLvoid);
    qgl.vertex_pointer(3, gl::FLOAT, 16, positions.as_ptr() as *const GLvoid);
    unsafe {
        qgl.draw_elements(mode, indices.len() as i32, gl::UNSIGNED_SHORT, indices.as_ptr() as *const GLvoid);
    }
    qgl.end_frame();

    for &stream in Stream::ALL.iter() {
        let text = memory.contents(&stream.file_name(1)).expect("missing stream");
        assert!(text.ends_with(&stream.trailer(1)));
    }
    let draws = memory.contents(&Stream::Draws.file_name(1)).expect("missing draws");
    assert_eq!(draws.contains("struct draw Draw_0"), !indices.is_empty());
});
