pub mod bootcamp;
pub mod course;
pub mod user;

pub use bootcamp::{Bootcamp, CreateBootcamp, UpdateBootcamp, BOOTCAMPS};
pub use course::{Course, CreateCourse, UpdateCourse, COURSES};
pub use user::{LoginRequest, RegisterUser, Role, User};
