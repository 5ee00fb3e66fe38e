//! Layer Model Module
//!
//! Layer definitions, the layer entity, renderable handles and legends.

mod definition;
mod layer;
mod legend;
mod renderable;
mod style;

pub use definition::{LayerDefinition, LayerQuery, LayerType};
pub use layer::{Layer, LayerContent, LayerData};
pub use legend::{Legend, LegendEntry};
pub use renderable::{RenderKind, Renderable, Shape, WeightedPoint, RADIUS_PROPERTY};
pub use style::{
    ClusterOptions, DisplayOptions, GradientStop, HeatmapOptions, LayerStyle, PopupInfo,
};
