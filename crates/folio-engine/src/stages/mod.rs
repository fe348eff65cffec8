pub mod gameplay;
pub mod preload;

pub use gameplay::{AreaState, ContentTrigger, GameplayStage, Player};
pub use preload::PreloadStage;
