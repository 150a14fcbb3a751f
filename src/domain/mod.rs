pub mod entity;
pub mod progression;
pub mod rules;
pub mod tile;
