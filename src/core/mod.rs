pub mod fetch;
pub mod load;
pub mod normalize;
pub mod pipeline;
