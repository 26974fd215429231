pub mod codec;
pub mod edns;

pub use codec::HickoryQueryCodec;
