mod hover;
mod particles;
mod pose;
mod tweens;

pub use hover::*;
pub use particles::*;
pub use pose::*;
pub use tweens::*;
