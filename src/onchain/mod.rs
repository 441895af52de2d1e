pub mod constants;
pub mod derive;
pub mod ixs;
pub mod state;
pub mod transfer;
pub mod tx;
pub mod typedefs;
