//! Action definitions.
//!
//! An [`ActionCollection`] maps action names to [`Action`]s, each holding
//! named [`Step`]s. Steps refer to each other with [`Reference`]s, either
//! bare (`compile`, same action) or qualified (`build.compile`).

pub mod model;
pub mod reference;
pub mod value;

pub use model::{Action, ActionCollection, Step};
pub use reference::{Reference, SEPARATOR};
pub use value::{Params, Value};
