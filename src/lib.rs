pub mod app;
pub mod config;
pub mod logging;
pub mod storage;
pub mod task;
pub mod task_list;
pub mod ui;
