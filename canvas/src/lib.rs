//! Interactive moodboard canvas engine.
//!
//! Holds an ordered set of visual items (images, video, audio, PDFs, text,
//! links) on an unbounded 2D surface and implements everything between raw
//! pointer input and a paint list: viewport fitting and zoom, selection,
//! drag-to-move, corner resize, layering, and per-type render dispatch.
//! Hosts own the actual DOM or GPU surface, the media players, and
//! persistence; they forward events to [`engine::BoardController`] and act on
//! the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Board controller and the actions it emits |
//! | [`board`] | Item collection, JSON loading, and sparse updates |
//! | [`geometry`] | Points, rects, and the canvas item model |
//! | [`viewport`] | Scale/pan transform, auto-fit, and zoom |
//! | [`selection`] | Single selection and paint order |
//! | [`input`] | Pointer targets, gesture state, and the pointer source seam |
//! | [`hit`] | Screen-space hit-testing |
//! | [`render`] | Content views, image load tracking, and renderer dispatch |
//! | [`config`] | Tunables with environment overrides |
//! | [`consts`] | Default numeric constants |

pub mod board;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod render;
pub mod selection;
pub mod viewport;
