/// Entity id construction helpers
pub mod ids;
/// Logger setup
pub mod logger;
/// Exact numeric conversions
pub mod numeric;
