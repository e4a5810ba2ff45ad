//! Floorplan3d - entity lights for an interactive 3D floorplan
//!
//! Binds home-automation light entities to point lights in a loaded model:
//! - Resolves each entity's on/off state, brightness and color into a target
//! - Animates light intensity toward that target every frame
//! - Turns clicks on lights into toggle commands, or debug coordinates

pub mod app;
pub mod command;
pub mod config;
pub mod lights;
pub mod model;
pub mod pick;
pub mod scene;
pub mod state;
