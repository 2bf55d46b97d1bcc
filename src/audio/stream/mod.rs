// Stream family: a shared operations core composed into two concrete
// per-direction endpoints. No inheritance; the facade hands out the concrete
// types and the framework dispatches against their direction-specific surface.

pub mod input;
pub mod ops;
pub mod output;

pub use input::AudioInputStream;
pub use ops::{negotiate_config, StreamOps};
pub use output::AudioOutputStream;
