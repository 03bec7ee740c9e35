//! Configuration for chainnet-dev

pub mod resources;
pub mod settings;

pub use resources::{
    Action, ClusterRole, ClusterSpec, ImageSource, InvalidAction, ManifestSpec, NodeManifests,
    ResourceKind, TargetOs,
};
pub use settings::Settings;
