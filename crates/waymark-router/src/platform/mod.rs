//! Platform bindings.
//!
//! Everything here is specific to the browser and only compiled for
//! `wasm32`. The rest of the crate reaches the platform through
//! [`HistoryBackend`](crate::HistoryBackend), [`ClickEvent`](crate::ClickEvent),
//! [`Outlet`](crate::Outlet) and `LocalSpawn`.

#[cfg(target_arch = "wasm32")]
pub mod browser;
