//! Core metadata model: values, descriptors, registries and errors

pub mod endpoints;
pub mod error;
pub mod metadata;
pub mod snapshot;
pub mod value;

pub use endpoints::{RouteRegistration, SerializerDescriptor, VisibleField};
pub use error::{ConfigError, JamError, ResolveError};
pub use metadata::{
    AppDescriptor, FieldDescriptor, ModelDescriptor, ModelRef, ModelRegistry, OptionSource,
    RelationDescriptor,
};
pub use snapshot::MetadataSnapshot;
pub use value::OptionValue;
