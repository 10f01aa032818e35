//! Range checks and index binning shared by the codec and the CLI.

pub mod binning;
pub mod validation;
