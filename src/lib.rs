//! Rain particle simulation library
//!
//! Emits short-lived physics-driven drops, pushes them with a jittered wind
//! force, draws a fading trail behind each one, and removes drops (and their
//! trails) once they reach the ground or outlive their deletion interval.

pub mod behavior;
pub mod config;
pub mod constants;
pub mod emitter;
pub mod error;
pub mod graphics;
pub mod ground;
pub mod rendering;
pub mod scene;
pub mod simulation;
pub mod trail;
pub mod wind;
