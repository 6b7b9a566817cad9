// Route handlers, one module per resource
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod utils;
