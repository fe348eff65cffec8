pub mod manifest;
pub mod registry;
pub mod source;

pub use manifest::AssetManifest;
pub use registry::{LoadedAssets, RenderScheme, SpriteRegistry};
pub use source::{AssetOutcome, AssetQueueHandle, AssetRequest, AssetSource, QueuedAssetSource, TextureInfo};
