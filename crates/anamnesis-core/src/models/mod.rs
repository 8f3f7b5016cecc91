pub mod image;
pub mod intake;
pub mod message;
pub mod outcome;
pub mod question;
pub mod session;
