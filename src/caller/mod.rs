//! Caller side of the pipeline: what the browser agent does before and after
//! talking to the host.

pub mod channels;
pub mod client;
pub mod confirm;
pub mod gate;
pub mod intercept;
pub mod location;

pub use client::{HostTransport, NativeHostClient};
pub use confirm::{
    ConfirmChannel, ConfirmationArbitrator, NotificationChannel, Notifier, PendingPrompts, Prompt,
    PromptEvents, PROMPT_TIMEOUT,
};
pub use gate::{Clock, RequestGate, SkipReason, SystemClock, Trigger};
pub use intercept::{
    FollowUp, Handled, InterceptOptions, InterceptOutcome, Interceptor, NoticeSink,
};
pub use location::{parse_hosted_url, HostedLocation, LocationError, ViewKind};
