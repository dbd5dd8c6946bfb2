pub mod parallel;

pub use parallel::map_maybe_par;
