mod component;
mod config;
mod detail;
mod error;
mod layout;
mod legend;
mod render;
pub mod scale;
mod state;
mod types;

pub use component::KnowledgeGraph;
pub use detail::NodeDetails;
pub use legend::Legend;
pub use types::GraphData;
