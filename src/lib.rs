// Audio hardware abstraction layer with use-case routing.
//
// Presents playback, capture, voice-call, FM, VoIP, and low-power offload
// streams as uniform byte-oriented channels while tracking the physical
// routing path, sample format, and buffer geometry each one needs. The
// platform PCM transport, the vendor use-case manager, and the hardware
// control surface plug in behind the traits in `audio::driver`.

pub mod audio;
pub mod log;
pub mod types;

pub use audio::{
    AudioHardware, AudioInputStream, AudioMode, AudioOutputStream, DeviceMask, DeviceSettings,
    HalError, SampleFormat, SetOutcome, StreamConfig, StreamDirection, TtyMode,
};
