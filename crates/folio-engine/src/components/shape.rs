/// Solid-colour rectangle drawn without any texture.
///
/// Terrain always renders this way. The player and content boxes fall back to it when no
/// atlas is usable, so the game stays playable without its art.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeComponent {
    /// RGBA, 0..1.
    pub color: [f32; 4],
}

impl ShapeComponent {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { color: [r, g, b, 1.0] }
    }

    /// From a 0xRRGGBB literal.
    pub fn hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }
}
