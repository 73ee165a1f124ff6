//! The scanning engine: a poll loop following the chain head and a block
//! scanner turning contract deployments into alerts.

pub mod block_scanner;
pub mod poll_loop;
