//! Library exports for the inkboard annotation engine.
//!
//! Hosts embed a [`input::Board`] per scoring record, feed it pointer events,
//! and draw the [`draw::DrawOp`] list it produces. Pen state is shared through
//! [`pen::PenService`] and boards persist through [`storage::PersistenceGateway`].

pub mod config;
pub mod draw;
pub mod input;
pub mod pen;
pub mod replay;
pub mod storage;

pub use config::Config;
