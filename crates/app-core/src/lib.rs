pub mod brightness;
pub mod constants;
pub mod effects;
pub mod error;
pub mod frame;
pub mod grid;
pub mod input;
pub mod layer;
pub mod state;
pub mod synth;
pub mod transport;

pub static GRID_WGSL: &str = include_str!("../shaders/grid.wgsl");

pub use brightness::*;
pub use constants::*;
pub use effects::*;
pub use error::*;
pub use frame::*;
pub use grid::*;
pub use input::*;
pub use layer::*;
pub use state::*;
pub use synth::*;
pub use transport::*;
