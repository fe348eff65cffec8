pub mod collision;
pub mod scene;
pub mod stage;
pub mod time;
