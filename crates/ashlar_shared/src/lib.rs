pub mod block;
pub mod chunk;
pub mod coords;
pub mod face;
pub mod mesh;
