pub mod archive;
pub mod dedup;
pub mod derive;
pub mod identity;
pub mod normalize;
pub mod parse;
pub mod scan;
