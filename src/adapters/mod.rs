// Adapters layer: concrete implementations for external systems (http, storage, station files).

pub mod http;
pub mod stations;
pub mod storage;
