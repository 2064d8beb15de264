mod combinatorial;
mod planarity;
mod planarize;

pub use combinatorial::Embed;
pub use planarize::Planarize;
