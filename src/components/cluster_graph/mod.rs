mod component;
mod forces;
mod hit_buffer;
mod interaction;
mod render;
mod state;
mod types;

pub use component::ClusterGraphCanvas;
pub use render::cluster_color;
pub use state::LayoutConfig;
pub use types::{ClusterGraphSnapshot, ClusterLink, ClusterNode, GraphEvent};
