pub mod burnout;
pub mod cache;
pub mod chemistry;
pub mod init;
pub mod load;
pub mod predict;
pub mod recommend;
pub mod strengths;
pub mod timing;
pub mod trends;
