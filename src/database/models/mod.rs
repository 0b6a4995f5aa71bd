pub mod note;
pub mod post;
pub mod user;

pub use note::{Note, NoteDetail, NoteListItem};
pub use post::{NewPost, Post, PostListing};
pub use user::User;
