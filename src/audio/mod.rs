// Audio HAL core, broken down into logical components:
// - types: core value types (modes, formats, device masks, settings)
// - error: error taxonomy and negotiation outcomes
// - params: flat key=value parameter encoding
// - driver: collaborator traits (PCM transport, use-case manager, controls)
// - control: mixer-control accessors
// - routing: routing resolver policy
// - handle: stream handles and their registry
// - stream: shared operations core plus the output/input endpoints
// - hardware: the facade owning global state and the coarse lock

pub mod control;
pub mod driver;
pub mod error;
pub mod handle;
pub mod hardware;
pub mod params;
pub mod routing;
pub mod stream;
pub mod types;

// Re-export commonly used types for easier imports
pub use control::{Mixer, MixerControl};
pub use error::{HalError, Result, SetOutcome};
pub use handle::{Handle, HandleRegistry};
pub use hardware::AudioHardware;
pub use params::ParameterMap;
pub use routing::{input_buffer_size, resolve, RoutingContext, RoutingPlan};
pub use stream::{AudioInputStream, AudioOutputStream};
pub use types::{
    AudioMode, DeviceMask, DeviceSettings, FluenceMode, SampleFormat, StreamConfig,
    StreamDirection, TtyMode,
};

pub use driver::{ControlBackend, PcmDriver, PcmRequest, PcmSession, Transfer, UseCaseManager};
