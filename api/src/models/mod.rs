pub mod comment;
pub mod module;
pub mod practice;
pub mod question;
