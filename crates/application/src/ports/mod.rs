pub mod event_system;
pub mod query_codec;
pub mod query_socket;

pub use event_system::{Direction, EventSystem, ReadinessHandler, Token};
pub use query_codec::{QueryCodec, ResponseHeader, RESPONSE_HEADER_LEN};
pub use query_socket::{OpenedSocket, QuerySocket, SocketFactory};
