pub mod loading;
pub mod notifications;
pub mod popup;
pub mod tables;
