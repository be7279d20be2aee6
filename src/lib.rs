pub mod api;
pub mod app;
pub mod controller;
pub mod presenter;
pub mod storage;
pub mod utils;
pub mod viewmodel;
