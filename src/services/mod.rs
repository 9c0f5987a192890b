pub mod estimate_loop;

pub use estimate_loop::run_estimator;
