pub mod frame;
pub mod sampler;
pub mod source;
pub mod still;
pub mod synthetic;

pub use frame::{FramePayload, RawFrame, JPEG_CONTENT_TYPE};
pub use sampler::{FrameSampler, SamplerConfig};
pub use source::{
    CaptureIndicator, FrameTap, MediaKind, MediaSource, MediaSourceConfig, MediaSourceFactory,
    SessionHandle, VideoStream,
};
pub use still::StillImageSource;
pub use synthetic::SyntheticSource;
