pub mod appointment;
pub mod common;
pub mod doctor;
pub mod event;
pub mod notification;
pub mod user;
