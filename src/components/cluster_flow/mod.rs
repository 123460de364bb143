mod component;
mod hit_test;
mod render;
mod scale;
mod stack;
mod types;

pub use component::ClusterFlowChart;
pub use scale::ChartMargins;
pub use types::{DailyClusterCounts, FlowEvent, FlowSnapshot, Tooltip};
