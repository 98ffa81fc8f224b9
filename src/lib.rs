use shadow_rs::shadow;

shadow!(build);

// Search space and problems
// -------------------------
pub mod problem;
pub mod search;
pub mod space;

// Internals
// ---------
pub mod frontier;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;

// Output
// ------
pub mod render;
pub mod view;
