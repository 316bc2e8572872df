pub mod comment;
pub mod follow;
pub mod interaction;
pub mod notification;
pub mod post;
pub mod user;
