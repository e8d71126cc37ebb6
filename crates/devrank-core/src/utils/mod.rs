pub mod clock;
pub mod paths;
