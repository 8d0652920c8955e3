pub mod camera;
pub mod mesher;
pub mod queue;
pub mod renderer;
pub mod settings;
