pub mod app;
pub mod channel;
pub mod error;
pub mod event;
pub mod locale;
pub mod ui;
pub mod view;
pub mod workflow;
