pub mod capture;
pub mod headers;
pub mod proxy;

pub use capture::{handle_capture, CaptureRequest, CaptureResponse, __path_handle_capture};
pub use proxy::{handle_proxy, ProxyQuery, __path_handle_proxy};
