/// Two triangles spanning clip space from (-1,-1) to (1,1), packed as xy pairs.
pub const FULLSCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

/// Components per vertex in [`FULLSCREEN_QUAD`].
pub const COMPONENTS: i32 = 2;

/// Vertices issued by the single draw call each frame.
pub const VERTEX_COUNT: i32 = FULLSCREEN_QUAD.len() as i32 / COMPONENTS;
