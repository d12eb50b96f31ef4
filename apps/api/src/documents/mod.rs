//! Stateless document actions: the listing page operations and a one-shot
//! data replacement that bypasses the editor session.

pub mod actions;
pub mod handlers;
