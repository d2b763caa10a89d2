// Pipeline processing stages: validate, partition, normalize, derive

pub mod derive;
pub mod normalize;
pub mod partition;
pub mod validate;
