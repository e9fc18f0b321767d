mod server;

pub use server::{AppState, BuyerIdentity, HttpServer, HttpServerConfig};
