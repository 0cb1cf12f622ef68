#[path = "core/activation.rs"]
pub mod activation;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/controller.rs"]
pub mod controller;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/interaction.rs"]
pub mod interaction;

#[path = "core/landscape.rs"]
pub mod landscape;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/projection.rs"]
pub mod projection;

#[path = "core/render.rs"]
pub mod render;

#[path = "core/schedule.rs"]
pub mod schedule;

pub mod observer;
pub mod surface;
