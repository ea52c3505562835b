pub mod app;
pub mod cli;
pub mod config;
pub mod filtered_list;
pub mod game;
pub mod installed_games;
pub mod log;
pub mod owned_games;
pub mod page;
pub mod source;
pub mod text_filter;
pub mod viewport;
