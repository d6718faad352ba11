//! Showroom data structures: surfaces, scene graphs, textures and materials.
//!
//! - `surface` contains the surface kinds, ids and the name-based classifier
//! - `transform` holds per-node translation/rotation/scale
//! - `scene_graph` enables hierarchical scene organization and world-space geometry
//! - `texture` contains texture references, decoded handles and border compositing
//! - `material` holds the per-mesh material slot the core mutates

pub mod material;
pub mod scene_graph;
pub mod surface;
pub mod texture;
pub mod transform;
