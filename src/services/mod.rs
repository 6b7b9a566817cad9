pub mod auth_service;
pub mod bootcamp_service;
pub mod course_service;

pub use auth_service::{AuthService, Session};
pub use bootcamp_service::{slugify, BootcampService};
pub use course_service::{recompute_average_cost, CourseService};
