pub mod generator;
pub mod raycast;
pub mod world;
