//! Framed transport and the request/response vocabulary spoken over it.

pub mod frame;
pub mod messages;

pub use frame::{read_frame, write_frame, FramedStream, MAX_FRAME_LEN};
pub use messages::{
    CloneRequest, HostRequest, HostResponse, OpenPayload, ResolveRequest, SwitchBranchRequest,
};
