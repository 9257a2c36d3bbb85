pub mod embed;

pub use embed::{run_embed_command, validate_embed_args, EmbedArgs};
