//! # Core Application Logic
//!
//! The chat, the avatar and the speech flow. It knows nothing about any
//! specific UI technology; hosts plug in through the [`media::MediaSource`],
//! [`surface::DrawingSurface`] and [`crate::speech::SpeechSynthesis`] traits.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  Time is passed in.     │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   Media    │      │   Speech   │
//!     │  Adapter   │      │   clips    │      │  engines   │
//!     │ (ratatui)  │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`avatar`]: Animation states and timed reversion
//! - [`chat`]: Message log and the reply catalog
//! - [`media`]: Text clips and their player
//! - [`surface`]: Resize policy and the per-frame copy onto the surface
//! - [`config`]: TOML config, env and CLI resolution

pub mod action;
pub mod avatar;
pub mod chat;
pub mod config;
pub mod media;
pub mod state;
pub mod surface;
