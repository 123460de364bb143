mod canvas;
pub mod cluster_flow;
pub mod cluster_graph;
mod fullscreen;
mod lifecycle;
