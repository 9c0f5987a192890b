pub mod feed;
pub mod pipeline;
pub mod replay;
pub mod stdin_listener;

pub use feed::{parse_feed_line, FeedEvent, TwapOrderRecord};
