pub mod bomb;
pub mod event;
pub mod generate;
pub mod map;
pub mod step;
pub mod world;
