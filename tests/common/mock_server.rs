use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock answers each query
#[derive(Debug, Clone, Copy)]
pub enum ServerBehavior {
    /// Echo the query back as a response with this RCODE
    Answer(u8),
    /// Read queries, never reply
    Silent,
}

#[derive(Default)]
struct Seen {
    count: AtomicUsize,
    last: Mutex<Option<Vec<u8>>>,
}

impl Seen {
    fn record(&self, query: &[u8]) {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(query.to_vec());
        }
    }
}

/// Mock DNS server on 127.0.0.1 with an ephemeral port.
///
/// Stops when dropped.
pub struct MockDnsServer {
    addr: SocketAddr,
    seen: Arc<Seen>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn udp(behavior: ServerBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let seen = Arc::new(Seen::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let server_seen = Arc::clone(&seen);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        server_seen.record(&buf[..len]);
                        if let Some(response) = Self::build_response(&buf[..len], behavior) {
                            let _ = socket.send_to(&response, peer).await;
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// TCP server speaking length-prefixed DNS, one query per connection.
    pub async fn tcp(behavior: ServerBehavior) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let seen = Arc::new(Seen::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let server_seen = Arc::clone(&seen);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        let Ok((mut stream, _)) = result else { continue };
                        let seen = Arc::clone(&server_seen);
                        tokio::spawn(async move {
                            let Ok(len) = stream.read_u16().await else { return };
                            let mut query = vec![0u8; len as usize];
                            if stream.read_exact(&mut query).await.is_err() {
                                return;
                            }
                            seen.record(&query);
                            let Some(response) = Self::build_response(&query, behavior) else {
                                // Hold the connection open until the client gives up.
                                let _ = stream.read_u8().await;
                                return;
                            };
                            let _ = stream.write_u16(response.len() as u16).await;
                            let _ = stream.write_all(&response).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of queries received so far
    pub fn queries_seen(&self) -> usize {
        self.seen.count.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<Vec<u8>> {
        self.seen.last.lock().ok().and_then(|last| last.clone())
    }

    /// Echoes the query with QR and RA set and the requested RCODE.
    pub fn build_response(query: &[u8], behavior: ServerBehavior) -> Option<Vec<u8>> {
        let ServerBehavior::Answer(rcode) = behavior else {
            return None;
        };
        if query.len() < 12 {
            return None;
        }

        let mut response = query.to_vec();
        response[2] |= 0x80; // QR=1, keep opcode and RD
        response[3] = 0x80 | (rcode & 0x0F); // RA=1
        Some(response)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_echoes_id_and_rcode() {
        let server = MockDnsServer::udp(ServerBehavior::Answer(3)).await.unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let query = vec![
            0x12, 0x34, // ID
            0x01, 0x00, // Flags: recursion desired
            0x00, 0x01, // Questions: 1
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Counts
        ];
        client.send_to(&query, server.addr()).await.unwrap();

        let mut buf = vec![0u8; 512];
        let (len, _) = client.recv_from(&mut buf).await.unwrap();

        assert_eq!(len, query.len());
        assert_eq!(buf[0..2], query[0..2], "Transaction ID should match");
        assert_eq!(buf[2], 0x81, "QR and RD set");
        assert_eq!(buf[3] & 0x0F, 3);
        assert_eq!(server.queries_seen(), 1);

        server.shutdown();
    }

    #[test]
    fn test_silent_builds_nothing() {
        let query = [0xab, 0xcd, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        assert!(MockDnsServer::build_response(&query, ServerBehavior::Silent).is_none());
        assert!(MockDnsServer::build_response(&query[..6], ServerBehavior::Answer(0)).is_none());
    }
}
