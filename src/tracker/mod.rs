pub mod book;
pub mod estimator;

pub use book::TwapBook;
