pub mod completions;
pub mod network;
pub mod region;
pub mod solve;
pub mod sweep;
pub mod util;
