pub mod dyndns;
pub mod txt;
