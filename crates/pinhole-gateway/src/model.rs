mod url;

pub use self::url::{CreateUrlRequest, CreateUrlResponse, HealthResponse};
