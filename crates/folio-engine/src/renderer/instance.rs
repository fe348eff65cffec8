use bytemuck::{Pod, Zeroable};

/// Per-sprite render data read by the page renderer through a raw pointer.
/// Must match the page protocol: 12 floats = 48 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Center X in world space.
    pub x: f32,
    /// Center Y in world space.
    pub y: f32,
    /// Rendered width. Negative mirrors the sprite horizontally.
    pub w: f32,
    /// Rendered height.
    pub h: f32,
    /// Atlas column.
    pub col: f32,
    /// Atlas row.
    pub row: f32,
    /// UV cell span (1.0 = single cell).
    pub span: f32,
    /// Atlas index.
    pub atlas: f32,
    /// Multiplicative tint.
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
}

impl SpriteInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Flat-colour rectangle: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ShapeInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Everything the page draws for one frame. Shapes are drawn first, then sprites;
/// each list is already in layer order.
pub struct RenderBuffer {
    pub shapes: Vec<ShapeInstance>,
    pub sprites: Vec<SpriteInstance>,
    /// Clear colour (RGB) for the current theme.
    pub background: [f32; 3],
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            shapes: Vec::with_capacity(64),
            sprites: Vec::with_capacity(16),
            background: [0.0; 3],
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.sprites.clear();
    }

    pub fn sprite_count(&self) -> u32 {
        self.sprites.len() as u32
    }

    pub fn shape_count(&self) -> u32 {
        self.shapes.len() as u32
    }

    /// Raw pointer to sprite data for zero-copy reads from the page.
    pub fn sprites_ptr(&self) -> *const f32 {
        self.sprites.as_ptr() as *const f32
    }

    pub fn shapes_ptr(&self) -> *const f32 {
        self.shapes.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
