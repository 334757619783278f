pub mod difficulty;
pub mod float_ext;
pub mod mods;
pub mod pos;
pub mod special_functions;
pub mod sync;
