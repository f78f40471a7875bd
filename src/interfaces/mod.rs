//! Interface layer - external entry points

pub mod http;
