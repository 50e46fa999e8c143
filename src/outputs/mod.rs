//! Output generation.
//!
//! - [`html`]: the single static digest page

pub mod html;
