//! showroom-ngin
//!
//! The interaction core of a 3D room showroom: click a wall or floor to select
//! it, then swap in catalog textures with a chosen physical tile size. The
//! crate owns picking, selection/highlight state and tiling math; rendering,
//! the DOM sidebar and the camera rig are collaborators behind small traits.
//! Works natively and on WASM.
//!
//! High-level modules
//! - `camera`: camera, projection and the viewport snapshot used for picking
//! - `config`: compile-time startup parameters and the asset manifest
//! - `controller`: pointer/resize/sidebar event handling over the selection state
//! - `data_structures`: surfaces, scene graph, textures and per-mesh materials
//! - `input`: winit window events to pointer actions
//! - `pick`: CPU ray casting against the scene graph
//! - `resources`: asset fetching, model ingestion, texture decoding, startup barrier
//! - `scene`: the scene collaborator trait and its in-crate implementation
//! - `selection`: selected/hovered surface and the highlight
//! - `showroom`: startup join, texture choice and teardown
//! - `tiling`: tile size to UV repeat/offset, bordered texture variants
//! - `timing`: clocks, throttle and debounce
//! - `ui`: the sidebar/tooltip seam and its view model
//!

pub mod camera;
pub mod config;
pub mod controller;
pub mod data_structures;
pub mod errors;
pub mod input;
pub mod pick;
pub mod resources;
pub mod scene;
pub mod selection;
pub mod showroom;
pub mod tiling;
pub mod timing;
pub mod ui;

// Re-exports commonly used types for convenience in downstream code.
pub use errors::{Result, ShowroomError};
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::UnwrapThrowExt;

/// Install the platform logger: `env_logger` natively, the browser console on WASM.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }
}
