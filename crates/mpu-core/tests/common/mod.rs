#![allow(dead_code)]

pub mod fake_remote;
pub mod upload_server;
