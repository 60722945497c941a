mod coin_box;
pub mod coin_class;
mod model_config;
mod tensor_layout;

pub use coin_box::*;
pub use coin_class::CoinClass;
pub use model_config::*;
pub use tensor_layout::*;
