pub mod config;
pub mod demo;
pub mod present;
pub mod replay;
pub mod shape;
