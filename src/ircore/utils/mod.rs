pub mod file_io;
pub mod serialize;
pub mod similarity;
pub mod sparse_vector;
