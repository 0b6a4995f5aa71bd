pub mod note_service;
pub mod post_service;
pub mod user_service;

pub use note_service::NoteService;
pub use post_service::PostService;
pub use user_service::UserService;
