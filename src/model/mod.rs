/// Hit objects and their validated collection.
pub mod hit_object;

/// Score state of a specific play.
pub mod score;
