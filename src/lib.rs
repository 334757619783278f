//! Library to calculate difficulty and performance attributes for rhythm game maps.
//!
//! ## Description
//!
//! `nova-pp` turns a time-ordered list of hit objects into a star rating and a
//! per-play performance point (pp) value. Beatmap parsing is out of scope;
//! maps enter the crate as [`HitObjects`] with slider nested events already
//! evaluated by the upstream loader.
//!
//! The difficulty side simulates strain over time for two skills, aim and
//! speed, and aggregates their section peaks into skill ratings. The
//! performance side combines those ratings with the hitresults of a play.
//!
//! ## Usage
//!
//! ```
//! use nova_pp::{model::hit_object::HitObjects, Difficulty};
//!
//! // Hit objects come from the beatmap loader.
//! let objects = HitObjects::new(Vec::new())?;
//!
//! // Calculate difficulty attributes
//! let diff_attrs = Difficulty::new()
//!     .cs(4.0)
//!     .ar(9.3)
//!     .od(8.8)
//!     .mods(8 + 16) // HDHR
//!     .calculate(&objects)?;
//!
//! let stars = diff_attrs.stars;
//!
//! // Calculate performance attributes, re-using the difficulty attributes.
//! let perf_attrs = diff_attrs
//!     .performance()
//!     .mods(24) // HDHR, same as before
//!     .accuracy(0.992)
//!     .misses(2)
//!     .calculate()?;
//!
//! let pp = perf_attrs.pp();
//!
//! println!("Stars: {stars} | PP: {pp}");
//! # Ok::<(), nova_pp::Error>(())
//! ```
//!
//! ## Gradual calculation
//!
//! [`GradualDifficulty`] yields the difficulty of every map prefix, either
//! through its [`Iterator`] impl or by jumping ahead with
//! [`GradualDifficulty::process_to`]. The latter takes a
//! [`CancellationToken`] so a long calculation can be aborted from another
//! thread and resumed later from its committed state.
//!
//! ## Features
//!
//! | Flag | Description | Dependencies
//! | - | - | -
//! | `default` | No features |
//! | `serde` | Implement `Serialize` and `Deserialize` for attribute and score types | [`serde`]
//! | `tracing` | Any error encountered during hit object validation will be logged through `tracing::error`. If this feature is not enabled, errors are only returned. | [`tracing`]
//!
//! [`HitObjects`]: crate::model::hit_object::HitObjects
//! [`serde`]: https://docs.rs/serde
//! [`tracing`]: https://docs.rs/tracing

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap
)]

#[doc(inline)]
pub use self::{
    attributes::{DifficultyAttributes, PerformanceAttributes, Strains},
    difficulty::{gradual::GradualDifficulty, Difficulty},
    error::Error,
    performance::Performance,
    util::{mods::Mods, sync::CancellationToken},
};

/// Difficulty and performance attributes.
pub mod attributes;

/// Everything about difficulty calculation.
pub mod difficulty;

/// The crate's central error type.
pub mod error;

/// Hit objects and score states.
pub mod model;

/// Everything about performance calculation.
pub mod performance;

mod util;
