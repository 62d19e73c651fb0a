#![allow(non_snake_case)]

pub mod config;
pub mod events;
pub mod models;
pub mod service;
pub mod store;
