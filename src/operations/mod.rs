pub mod compaction;
pub mod embedding;
pub mod orthogonalize;
pub mod rectangularize;
