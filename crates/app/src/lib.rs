//! Terminal client for asset cards, local or shared through a room.
//!
//! [`AppController`](controller::AppController) owns all client state and
//! decides where every write goes; [`view`] renders that state as text.

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod form;
pub mod launch;
pub mod toast;
pub mod view;
