pub mod challenge;
pub mod system;
