pub mod scan;
pub mod search;
