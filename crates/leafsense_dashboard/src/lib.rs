//! Admin console for the LeafSense REST backend.
//!
//! Polls feedback, predictions, appointments and profiles into a
//! [`DashboardState`], renders them as text tables and lets the operator
//! approve, reject, cancel or remove appointments.

pub mod actions;
pub mod client;
pub mod models;
pub mod poller;
pub mod render;
pub mod state;

pub use actions::{AdminConsole, AssumeYes, InquireOperator, Operator};
pub use client::{AdminApiClient, DashboardError};
pub use render::{render, RenderOptions, Section, StatusFilter, TimeDisplay};
pub use state::{Banner, BannerKind, DashboardState, DashboardStats};
