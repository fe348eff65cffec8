/// Draw order for entities, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum RenderLayer {
    /// Ground tiles and floating platforms.
    Terrain = 0,
    /// Content boxes.
    #[default]
    Objects = 1,
    /// The player, always drawn over the boxes it passes through.
    Actors = 2,
}

impl RenderLayer {
    pub const COUNT: usize = 3;
}
