/// Identifies which texture atlas a sprite belongs to.
/// Index into the AssetManifest's atlas list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasId(pub u32);

/// Sprite component: one cell of a grid atlas, optionally tinted and mirrored.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    /// Which atlas this sprite belongs to.
    pub atlas: AtlasId,
    /// Column in the atlas grid.
    pub col: f32,
    /// Row in the atlas grid.
    pub row: f32,
    /// Number of cells this sprite spans (1.0 = single cell, 2.0 = 2x2 block).
    pub cell_span: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Multiplicative tint (RGB, 1.0 = untouched).
    pub tint: [f32; 3],
    /// Mirror horizontally (player facing left).
    pub flip_x: bool,
}

impl SpriteComponent {
    pub fn cell(atlas: AtlasId, col: f32, row: f32) -> Self {
        Self {
            atlas,
            col,
            row,
            ..Default::default()
        }
    }

    pub fn with_tint(mut self, tint: [f32; 3]) -> Self {
        self.tint = tint;
        self
    }
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            atlas: AtlasId(0),
            col: 0.0,
            row: 0.0,
            cell_span: 1.0,
            alpha: 1.0,
            tint: [1.0, 1.0, 1.0],
            flip_x: false,
        }
    }
}
