pub mod handler;
pub mod msg_join_handler;
pub mod msg_typing_handler;
pub mod msg_update_handler;
