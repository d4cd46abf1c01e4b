pub mod bar;
pub mod domain;
pub mod session;
pub mod window;
