//! Translation between the on-chain representation of pool events and the
//! domain model. Nothing outside this module deals with raw logs.

pub mod abi;
