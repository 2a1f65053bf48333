//! typeahead_core - The stateful typeahead engine.
//!
//! Attach an [`Autocomplete`] to a host element with [`attach`], then feed it
//! [`Event`]s. The host supplies the view, the transport and the timers
//! through the traits in [`host`].

pub mod attach;
pub mod behavior;
pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use attach::{attach, attach_all};
pub use behavior::{Behavior, CustomBehavior, Effect, EngineState};
pub use config::{Attributes, EngineConfig, InstanceConfig, MappingSpec, NoAttributes, load_instance_config};
pub use error::{AttachError, ConfigError, Result, TransportError, TypeaheadError};
pub use host::{
    BoundInput, ElementKind, Geometry, Host, HttpRequest, HttpResponse, Placement, RequestId, Scheduler, TimerId,
    TimerKind, Transport, ViewSurface,
};
pub use pipeline::{Completion, RequestPipeline, build_request};
pub use session::{Autocomplete, Disposition, Event};
pub use typeahead_engine as engine;
